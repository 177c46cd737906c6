//! Stopwatch engine
//!
//! The engine is a clock-delta state machine. Elapsed time is always
//! `baseline + (now - epoch_start)`, never a count of ticks, so a late or
//! coalesced tick only delays a display refresh and never skews the value.
//!
//! ## State Transitions
//!
//! ```text
//!           start                pause
//! Idle ───────────▶ Running ───────────▶ Paused
//!  ▲                  │  ▲                 │
//!  │       stop       │  └──start/pause────┘
//!  └──────────────────┴─────── stop ◀──────┘
//! ```
//!
//! While `Running` the engine owns exactly one [`ScheduleHandle`]; leaving
//! `Running` releases it. Ticks carry the generation of the schedule that
//! produced them and are dropped unless that generation is still active.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, error, info};

use super::timer_state::{TimerMode, TimerStatus, TimerView};
use crate::tasks::ticker::{Generation, ScheduleHandle, TickSender};

/// Default interval between ticks
pub const DEFAULT_RATE: Duration = Duration::from_millis(1000);

/// Shortest interval a schedule accepts
pub const MIN_RATE: Duration = Duration::from_millis(1);

/// Notification hook
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Optional notification hooks, invoked after the transition is committed
#[derive(Clone, Default)]
pub struct TimerHooks {
    pub on_start: Option<Hook>,
    pub on_stop: Option<Hook>,
    pub on_pause: Option<Hook>,
    pub on_tick: Option<Hook>,
}

impl fmt::Debug for TimerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .field("on_pause", &self.on_pause.is_some())
            .field("on_tick", &self.on_tick.is_some())
            .finish()
    }
}

/// Run a hook. A panicking hook is logged and swallowed so it cannot unwind
/// through the lock the caller holds on the engine.
fn fire(name: &str, hook: &Option<Hook>) {
    if let Some(hook) = hook {
        if panic::catch_unwind(AssertUnwindSafe(|| hook())).is_err() {
            error!("Timer {} hook panicked", name);
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct TimerConfig {
    rate: Duration,
    pub hooks: TimerHooks,
}

impl TimerConfig {
    pub fn new(rate: Duration) -> Self {
        Self::default().with_rate(rate)
    }

    /// Set the tick interval. Zero is raised to [`MIN_RATE`].
    pub fn with_rate(mut self, rate: Duration) -> Self {
        self.rate = rate.max(MIN_RATE);
        self
    }

    pub fn rate(&self) -> Duration {
        self.rate
    }

    pub fn on_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_start = Some(Arc::new(hook));
        self
    }

    pub fn on_stop(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_stop = Some(Arc::new(hook));
        self
    }

    pub fn on_pause(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_pause = Some(Arc::new(hook));
        self
    }

    pub fn on_tick(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_tick = Some(Arc::new(hook));
        self
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            hooks: TimerHooks::default(),
        }
    }
}

/// User-facing timer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Stop,
    /// Start/pause button: pauses when running, starts otherwise
    Toggle,
}

impl TimerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerAction::Start => "start",
            TimerAction::Pause => "pause",
            TimerAction::Stop => "stop",
            TimerAction::Toggle => "toggle",
        }
    }
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stopwatch state machine.
///
/// Methods that arm a schedule (`start`, and `pause`/`toggle` when they
/// resume) must be called from within a Tokio runtime.
#[derive(Debug)]
pub struct TimerEngine {
    config: TimerConfig,
    mode: TimerMode,
    /// Generation of the most recently armed schedule
    generation: Generation,
    /// Present iff `mode` is `Running`
    schedule: Option<ScheduleHandle>,
    ticks: TickSender,
    view_tx: watch::Sender<TimerView>,
}

impl TimerEngine {
    /// Create an idle engine whose schedules send into `ticks`
    pub fn new(config: TimerConfig, ticks: TickSender) -> Self {
        let (view_tx, _) = watch::channel(TimerView::idle());
        Self {
            config,
            mode: TimerMode::Idle,
            generation: Generation::default(),
            schedule: None,
            ticks,
            view_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.mode.status()
    }

    /// Live while running, frozen otherwise
    pub fn elapsed(&self) -> Duration {
        self.mode.elapsed_at(Instant::now())
    }

    pub fn view(&self) -> TimerView {
        TimerView::at(&self.mode, Instant::now())
    }

    /// Generation of the live schedule, if any
    pub fn active_generation(&self) -> Option<Generation> {
        self.schedule.as_ref().map(ScheduleHandle::generation)
    }

    /// Receiver that observes every published view
    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.view_tx.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply a user action and return the resulting view
    pub fn apply(&mut self, action: TimerAction) -> TimerView {
        match action {
            TimerAction::Start => self.start(),
            TimerAction::Pause => self.pause(),
            TimerAction::Stop => self.stop(),
            TimerAction::Toggle => self.toggle(),
        }
    }

    pub fn start(&mut self) -> TimerView {
        let baseline = match self.mode {
            TimerMode::Idle => Duration::ZERO,
            TimerMode::Paused { baseline } => baseline,
            TimerMode::Running { .. } => {
                debug!("Start ignored, timer already running");
                return self.view();
            }
        };

        self.generation = self.generation.next();
        self.release_schedule();
        self.schedule = Some(ScheduleHandle::arm(
            self.generation,
            self.config.rate,
            self.ticks.clone(),
        ));
        self.mode = TimerMode::Running {
            epoch_start: Instant::now(),
            baseline,
        };
        info!("Timer started with baseline {:?} (schedule {})", baseline, self.generation);

        let view = self.publish();
        fire("start", &self.config.hooks.on_start);
        view
    }

    /// Pause when running; resume when paused; no-op when idle
    pub fn pause(&mut self) -> TimerView {
        match self.mode {
            TimerMode::Running { .. } => {
                let baseline = self.elapsed();
                self.release_schedule();
                self.mode = TimerMode::Paused { baseline };
                info!("Timer paused at {:?}", baseline);

                let view = self.publish();
                fire("pause", &self.config.hooks.on_pause);
                view
            }
            TimerMode::Paused { .. } => self.start(),
            TimerMode::Idle => {
                debug!("Pause ignored, timer idle");
                self.view()
            }
        }
    }

    pub fn stop(&mut self) -> TimerView {
        self.release_schedule();
        if self.mode == TimerMode::Idle {
            debug!("Stop ignored, timer idle");
            return self.view();
        }

        self.mode = TimerMode::Idle;
        info!("Timer stopped");

        let view = self.publish();
        fire("stop", &self.config.hooks.on_stop);
        view
    }

    pub fn toggle(&mut self) -> TimerView {
        if self.mode.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Handle a tick from the schedule armed under `generation`.
    ///
    /// Returns the refreshed view, or `None` when the tick is stale.
    pub fn tick(&mut self, generation: Generation) -> Option<TimerView> {
        if !self.mode.is_running() || self.active_generation() != Some(generation) {
            debug!("Dropping stale tick from schedule {}", generation);
            return None;
        }

        let view = self.publish();
        debug!("Tick {}: {} ms elapsed", generation, view.elapsed_ms);
        fire("tick", &self.config.hooks.on_tick);
        Some(view)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn release_schedule(&mut self) {
        if let Some(schedule) = self.schedule.take() {
            schedule.cancel();
        }
    }

    fn publish(&self) -> TimerView {
        let view = self.view();
        self.view_tx.send_replace(view);
        view
    }
}

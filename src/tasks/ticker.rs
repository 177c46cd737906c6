//! Periodic tick schedule
//!
//! A schedule is a background task that sends a [`TickSignal`] into the tick
//! queue once per interval. Each schedule is tagged with the [`Generation`]
//! it was armed under so the engine can tell a live signal from one that was
//! queued by a schedule that has since been cancelled.

use std::{fmt, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Tag distinguishing one armed schedule from every earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// The generation following this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message sent by a schedule on every interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: Generation,
}

/// Sending half of the tick queue
pub type TickSender = mpsc::UnboundedSender<TickSignal>;
/// Receiving half of the tick queue
pub type TickReceiver = mpsc::UnboundedReceiver<TickSignal>;

/// Create the tick queue shared by every schedule of one engine
pub fn tick_channel() -> (TickSender, TickReceiver) {
    mpsc::unbounded_channel()
}

/// Owned handle to a running schedule.
///
/// Dropping the handle aborts the task, so a schedule can never outlive the
/// engine that armed it.
#[derive(Debug)]
pub struct ScheduleHandle {
    generation: Generation,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Arm a schedule that sends a tick for `generation` every `rate`.
    ///
    /// The first tick is due one full `rate` after arming. Missed ticks are
    /// skipped rather than delivered in a burst.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, or if `rate` is zero.
    pub fn arm(generation: Generation, rate: Duration, ticks: TickSender) -> Self {
        let first = Instant::now() + rate;
        debug!("Arming schedule {} every {:?}", generation, rate);

        let task = tokio::spawn(async move {
            let mut interval = interval_at(first, rate);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if ticks.send(TickSignal { generation }).is_err() {
                    debug!("Tick queue closed, schedule {} exiting", generation);
                    break;
                }
            }
        });

        Self { generation, task }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the schedule. Already queued signals are left for the engine's
    /// generation check to discard.
    pub fn cancel(self) {
        debug!("Cancelling schedule {}", self.generation);
        // Drop aborts the task.
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

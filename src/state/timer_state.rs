//! Timer mode and the read model published to the rendering layer

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Internal timer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    #[default]
    Idle,
    Running {
        epoch_start: Instant,
        baseline: Duration,
    },
    Paused {
        baseline: Duration,
    },
}

impl TimerMode {
    /// Elapsed time as of `now`
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match *self {
            TimerMode::Idle => Duration::ZERO,
            TimerMode::Running { epoch_start, baseline } => {
                baseline + now.saturating_duration_since(epoch_start)
            }
            TimerMode::Paused { baseline } => baseline,
        }
    }

    pub fn status(&self) -> TimerStatus {
        match self {
            TimerMode::Idle => TimerStatus::Idle,
            TimerMode::Running { .. } => TimerStatus::Running,
            TimerMode::Paused { .. } => TimerStatus::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerMode::Running { .. })
    }
}

/// Coarse timer status, as exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    /// Label of the combined start/pause button
    pub fn button_label(self) -> ButtonLabel {
        match self {
            TimerStatus::Idle => ButtonLabel::Start,
            TimerStatus::Running => ButtonLabel::Pause,
            TimerStatus::Paused => ButtonLabel::Resume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonLabel {
    Start,
    Pause,
    Resume,
}

/// Snapshot of the timer for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub status: TimerStatus,
    /// Whole seconds, rounded up
    pub display_value: u64,
    pub elapsed_ms: u64,
    pub button_label: ButtonLabel,
}

impl TimerView {
    /// Build the view for `mode` as of `now`
    pub fn at(mode: &TimerMode, now: Instant) -> Self {
        let elapsed = mode.elapsed_at(now);
        let status = mode.status();
        Self {
            status,
            display_value: display_seconds(elapsed),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            button_label: status.button_label(),
        }
    }

    /// View of a freshly created or stopped timer
    pub fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            display_value: 0,
            elapsed_ms: 0,
            button_label: ButtonLabel::Start,
        }
    }
}

impl Default for TimerView {
    fn default() -> Self {
        Self::idle()
    }
}

/// `ceil(elapsed)` in whole seconds
pub fn display_seconds(elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs();
    if elapsed.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rounds_up() {
        assert_eq!(display_seconds(Duration::ZERO), 0);
        assert_eq!(display_seconds(Duration::from_millis(1)), 1);
        assert_eq!(display_seconds(Duration::from_millis(1000)), 1);
        assert_eq!(display_seconds(Duration::from_millis(1001)), 2);
        assert_eq!(display_seconds(Duration::from_secs(59)), 59);
    }

    #[test]
    fn button_labels_follow_status() {
        assert_eq!(TimerStatus::Idle.button_label(), ButtonLabel::Start);
        assert_eq!(TimerStatus::Running.button_label(), ButtonLabel::Pause);
        assert_eq!(TimerStatus::Paused.button_label(), ButtonLabel::Resume);
    }

    #[test]
    fn paused_view_is_frozen() {
        let mode = TimerMode::Paused { baseline: Duration::from_millis(2500) };
        let now = Instant::now();
        let later = now + Duration::from_secs(30);
        assert_eq!(TimerView::at(&mode, now), TimerView::at(&mode, later));
        assert_eq!(TimerView::at(&mode, now).display_value, 3);
        assert_eq!(TimerView::at(&mode, now).button_label, ButtonLabel::Resume);
    }

    #[test]
    fn running_elapsed_adds_baseline() {
        let epoch_start = Instant::now();
        let mode = TimerMode::Running { epoch_start, baseline: Duration::from_secs(4) };
        let view = TimerView::at(&mode, epoch_start + Duration::from_millis(1500));
        assert_eq!(view.elapsed_ms, 5500);
        assert_eq!(view.display_value, 6);
        assert_eq!(view.status, TimerStatus::Running);
    }

    #[test]
    fn idle_view_matches_idle_mode() {
        assert_eq!(TimerView::at(&TimerMode::Idle, Instant::now()), TimerView::idle());
    }
}

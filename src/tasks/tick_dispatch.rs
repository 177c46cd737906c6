//! Tick dispatch background task

use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

use super::ticker::TickReceiver;
use crate::state::AppState;

/// Background task that feeds schedule ticks to the timer engine.
///
/// This is the only consumer of the tick queue. It takes the same lock as
/// user actions, so a tick and an action never interleave. The state is held
/// weakly: once the owner drops it, the engine and its schedules go with it,
/// the queue closes and the task exits.
pub async fn tick_dispatch_task(state: Weak<AppState>, mut ticks: TickReceiver) {
    info!("Starting tick dispatch task");

    while let Some(signal) = ticks.recv().await {
        let Some(state) = state.upgrade() else {
            break;
        };

        match state.timer_tick(signal.generation) {
            Ok(Some(view)) => {
                debug!("Timer at {}s ({} ms)", view.display_value, view.elapsed_ms);
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to deliver tick {}: {}", signal.generation, e);
            }
        }
    }

    info!("Tick queue closed, dispatch task exiting");
}

/// Spawn [`tick_dispatch_task`] for `state`
pub fn spawn_tick_dispatch(state: &Arc<AppState>, ticks: TickReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(tick_dispatch_task(Arc::downgrade(state), ticks))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::{TimerAction, TimerConfig, TimerStatus};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn shared_state() -> (Arc<AppState>, TickReceiver) {
        let (state, rx) = AppState::new(0, "127.0.0.1".to_string(), TimerConfig::default());
        (Arc::new(state), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_publishes_ticks() {
        let (state, rx) = shared_state();
        let mut views = state.subscribe_timer().unwrap();
        let task = spawn_tick_dispatch(&state, rx);

        state.timer_action(TimerAction::Start).unwrap();
        views.borrow_and_update();

        tokio::time::advance(Duration::from_millis(2500)).await;
        settle().await;

        assert!(views.has_changed().unwrap());
        let view = *views.borrow_and_update();
        assert_eq!(view.status, TimerStatus::Running);
        assert_eq!(view.display_value, 3);

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_publishes_nothing() {
        let (state, rx) = shared_state();
        let mut views = state.subscribe_timer().unwrap();
        let task = spawn_tick_dispatch(&state, rx);

        state.timer_action(TimerAction::Start).unwrap();
        state.timer_action(TimerAction::Pause).unwrap();
        views.borrow_and_update();

        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;
        assert!(!views.has_changed().unwrap());

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_exits_when_state_is_dropped() {
        let (state, rx) = shared_state();
        let task = spawn_tick_dispatch(&state, rx);

        state.timer_action(TimerAction::Start).unwrap();
        drop(state);
        settle().await;

        assert!(task.is_finished());
    }
}

//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Slot, SlotId, SlotRegistry, TimerAction, TimerConfig, TimerEngine, TimerView};
use crate::tasks::ticker::{tick_channel, Generation, TickReceiver};

/// Owner of the timer engine and the slot registry
#[derive(Debug)]
pub struct AppState {
    pub timer: Arc<Mutex<TimerEngine>>,
    pub slots: Arc<Mutex<SlotRegistry>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for slot list updates
    pub slots_update_tx: watch::Sender<Vec<Slot>>,
}

impl AppState {
    /// Create the state together with the tick queue its timer feeds.
    ///
    /// The receiver must be handed to
    /// [`tick_dispatch_task`](crate::tasks::tick_dispatch_task).
    pub fn new(port: u16, host: String, timer_config: TimerConfig) -> (Self, TickReceiver) {
        let (tick_tx, tick_rx) = tick_channel();
        let (slots_update_tx, _) = watch::channel(Vec::new());

        let state = Self {
            timer: Arc::new(Mutex::new(TimerEngine::new(timer_config, tick_tx))),
            slots: Arc::new(Mutex::new(SlotRegistry::new())),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            slots_update_tx,
        };
        (state, tick_rx)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply a timer action
    pub fn timer_action(&self, action: TimerAction) -> Result<TimerView, String> {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;

        let view = timer.apply(action);
        drop(timer);

        self.record_action(action.as_str());
        Ok(view)
    }

    /// Deliver a tick from the schedule tagged `generation`
    pub fn timer_tick(&self, generation: Generation) -> Result<Option<TimerView>, String> {
        self.timer.lock()
            .map(|mut timer| timer.tick(generation))
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Get current timer view
    pub fn get_timer_view(&self) -> Result<TimerView, String> {
        self.timer.lock()
            .map(|timer| timer.view())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Subscribe to published timer views
    pub fn subscribe_timer(&self) -> Result<watch::Receiver<TimerView>, String> {
        self.timer.lock()
            .map(|timer| timer.subscribe())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Subscribe to slot list updates
    pub fn subscribe_slots(&self) -> watch::Receiver<Vec<Slot>> {
        self.slots_update_tx.subscribe()
    }

    /// Update the slot registry and notify slot watchers
    fn update_slots<F, T>(&self, action: &str, updater: F) -> Result<T, String>
    where
        F: FnOnce(&mut SlotRegistry) -> T,
    {
        let mut slots = self.slots.lock()
            .map_err(|e| format!("Failed to lock slots: {}", e))?;

        let result = updater(&mut *slots);
        let snapshot = slots.list().to_vec();
        drop(slots);

        self.record_action(action);
        self.slots_update_tx.send_replace(snapshot);
        Ok(result)
    }

    /// Append a new slot
    pub fn add_slot(&self) -> Result<Slot, String> {
        self.update_slots("add-slot", SlotRegistry::add)
    }

    /// Remove a slot; missing ids are ignored
    pub fn remove_slot(&self, id: SlotId) -> Result<Option<Slot>, String> {
        self.update_slots("remove-slot", |slots| slots.remove(id))
    }

    /// Get current slot list
    pub fn get_slots(&self) -> Result<Vec<Slot>, String> {
        self.slots.lock()
            .map(|slots| slots.list().to_vec())
            .map_err(|e| format!("Failed to lock slots: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop the timer so no schedule survives shutdown
    pub fn shutdown(&self) {
        match self.timer.lock() {
            Ok(mut timer) => {
                timer.stop();
                info!("Timer released for shutdown");
            }
            Err(e) => warn!("Failed to lock timer during shutdown: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::TimerStatus;

    fn state() -> (AppState, TickReceiver) {
        AppState::new(0, "127.0.0.1".to_string(), TimerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn timer_actions_are_recorded() {
        let (state, _rx) = state();
        let view = state.timer_action(TimerAction::Toggle).unwrap();
        assert_eq!(view.status, TimerStatus::Running);

        let (action, at) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("toggle"));
        assert!(at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_route_to_the_engine() {
        let (state, mut rx) = state();
        state.timer_action(TimerAction::Start).unwrap();

        tokio::time::advance(Duration::from_millis(1001)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let signal = rx.try_recv().unwrap();
        let view = state.timer_tick(signal.generation).unwrap().unwrap();
        assert_eq!(view.elapsed_ms, 1001);
        assert_eq!(view.display_value, 2);
    }

    #[test]
    fn slot_updates_are_broadcast() {
        let (state, _rx) = state();
        let mut updates = state.subscribe_slots();

        let slot = state.add_slot().unwrap();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().as_slice(), &[slot.clone()]);

        assert_eq!(state.remove_slot(slot.id).unwrap(), Some(slot));
        assert!(updates.borrow_and_update().is_empty());
        assert_eq!(state.get_last_action().0.as_deref(), Some("remove-slot"));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_hook_does_not_lock_out_the_timer() {
        let config = TimerConfig::default().on_start(|| panic!("hook failed"));
        let (state, _rx) = AppState::new(0, "127.0.0.1".to_string(), config);

        let view = state.timer_action(TimerAction::Start).unwrap();
        assert_eq!(view.status, TimerStatus::Running);
        assert!(!state.timer.is_poisoned());
        assert_eq!(state.get_timer_view().unwrap().status, TimerStatus::Running);

        assert_eq!(state.timer_action(TimerAction::Stop).unwrap(), TimerView::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_leaves_timer_idle() {
        let (state, _rx) = state();
        state.timer_action(TimerAction::Start).unwrap();
        state.shutdown();
        assert_eq!(state.get_timer_view().unwrap(), TimerView::idle());
    }

    #[test]
    fn uptime_is_formatted() {
        let (state, _rx) = state();
        assert!(state.get_uptime().ends_with('s'));
    }
}

//! State management module
//!
//! The two core components and the application state that owns them.

pub mod app_state;
pub mod slot_registry;
pub mod timer_engine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use slot_registry::{Slot, SlotId, SlotRegistry};
pub use timer_engine::{TimerAction, TimerConfig, TimerEngine, TimerHooks};
pub use timer_state::{ButtonLabel, TimerMode, TimerStatus, TimerView};

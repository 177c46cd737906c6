//! Slot Timer - A drift-free stopwatch engine with a keyed slot list
//!
//! The core is two independent components:
//!
//! - [`TimerEngine`]: start/pause/resume/stop state machine whose elapsed
//!   time is derived from clock deltas, with a cancellable periodic tick
//!   schedule tagged by generation.
//! - [`SlotRegistry`]: ordered collection of slots with generated ids.
//!
//! [`AppState`] owns one of each; the binary serves them over HTTP.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, SlotRegistry, TimerAction, TimerConfig, TimerEngine, TimerView};
pub use api::create_router;
pub use utils::signals::shutdown_signal;

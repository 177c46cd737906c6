//! Background tasks module
//!
//! The periodic tick schedule and the task that feeds its ticks to the timer.

pub mod tick_dispatch;
pub mod ticker;

// Re-export main functions
pub use tick_dispatch::{spawn_tick_dispatch, tick_dispatch_task};
pub use ticker::{Generation, ScheduleHandle, TickSignal};

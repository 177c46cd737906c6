//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Slot, TimerAction, TimerView};

/// Response for timer action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub action: TimerAction,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    pub fn new(action: TimerAction, timer: TimerView) -> Self {
        Self {
            action,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for slot removal: what was removed (if anything) and what is left
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub removed: Option<Slot>,
    pub slots: Vec<Slot>,
}

/// Status response combining both components and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub slots: Vec<Slot>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

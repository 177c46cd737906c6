//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info};

use crate::state::{AppState, Slot, SlotId, TimerAction, TimerView};
use super::responses::{ApiResponse, HealthResponse, SlotsResponse, StatusResponse};

fn internal_error(context: &str, e: String) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Handle GET /timer - Current timer view
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerView>, StatusCode> {
    state
        .get_timer_view()
        .map(Json)
        .map_err(|e| internal_error("Failed to read timer", e))
}

/// Handle POST /timer/:action - Start, pause, stop or toggle the timer
pub async fn timer_action_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<TimerAction>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.timer_action(action) {
        Ok(view) => {
            info!("Timer {} endpoint called - timer now {:?}", action, view.status);
            Ok(Json(ApiResponse::new(action, view)))
        }
        Err(e) => Err(internal_error(&format!("Failed to {} timer", action), e)),
    }
}

/// Handle GET /slots - List slots in insertion order
pub async fn slots_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Slot>>, StatusCode> {
    state
        .get_slots()
        .map(Json)
        .map_err(|e| internal_error("Failed to read slots", e))
}

/// Handle POST /slots - Append a new slot
pub async fn add_slot_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Slot>), StatusCode> {
    match state.add_slot() {
        Ok(slot) => {
            info!("Add slot endpoint called - created {}", slot.id);
            Ok((StatusCode::CREATED, Json(slot)))
        }
        Err(e) => Err(internal_error("Failed to add slot", e)),
    }
}

/// Handle DELETE /slots/:id - Remove a slot; unknown ids are a no-op
pub async fn remove_slot_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SlotId>,
) -> Result<Json<SlotsResponse>, StatusCode> {
    let removed = state
        .remove_slot(id)
        .map_err(|e| internal_error("Failed to remove slot", e))?;
    let slots = state
        .get_slots()
        .map_err(|e| internal_error("Failed to read slots", e))?;

    Ok(Json(SlotsResponse { removed, slots }))
}

/// Handle GET /status - Return timer, slots and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state
        .get_timer_view()
        .map_err(|e| internal_error("Failed to read timer", e))?;
    let slots = state
        .get_slots()
        .map_err(|e| internal_error("Failed to read slots", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        slots,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream timer views and slot lists as server-sent
/// events. Each stream opens with the current value.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, StatusCode> {
    let timer = state
        .subscribe_timer()
        .map_err(|e| internal_error("Failed to subscribe to timer", e))?;
    info!("Events endpoint called - client subscribed");

    let timer_events = WatchStream::new(timer)
        .map(|view| Event::default().event("timer").json_data(view));
    let slot_events = WatchStream::new(state.subscribe_slots())
        .map(|slots| Event::default().event("slots").json_data(slots));

    Ok(Sse::new(stream::select(timer_events, slot_events)).keep_alive(KeepAlive::default()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

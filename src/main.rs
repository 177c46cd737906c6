//! Slot Timer - stopwatch and slot list served over HTTP
//!
//! This is the main entry point for the slot-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use slot_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::spawn_tick_dispatch,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("slot_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting slot-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, rate={}ms",
          config.host, config.port, config.rate);

    // Create application state and the tick queue its timer feeds
    let (state, ticks) = AppState::new(config.port, config.host.clone(), config.timer_config());
    let state = Arc::new(state);

    // Deliver schedule ticks to the timer
    let dispatch = spawn_tick_dispatch(&state, ticks);

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timer          - Current timer view");
    info!("  POST   /timer/:action  - start | pause | stop | toggle");
    info!("  GET    /slots          - List slots");
    info!("  POST   /slots          - Add a slot");
    info!("  DELETE /slots/:id      - Remove a slot");
    info!("  GET    /events         - Server-sent timer and slot updates");
    info!("  GET    /status         - Timer, slots and server info");
    info!("  GET    /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    dispatch.abort();

    info!("Server shutdown complete");
    Ok(())
}

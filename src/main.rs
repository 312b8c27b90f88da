//! Countdown Dial - A state-managed HTTP server exposing a countdown screen
//!
//! This is the main entry point for the countdown-dial application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_dial::{
    config::Config,
    state::AppState,
    api::create_router,
    services::TokioScheduler,
    tasks::progress_logger_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .init();

    info!("Starting countdown-dial server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    // Create application state
    let state = AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(TokioScheduler::new()),
    );

    // Start the progress logger background task
    let logger_state = Arc::clone(&state);
    tokio::spawn(async move {
        progress_logger_task(logger_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /screen                        - Current screen");
    info!("  POST /counters/{{minutes|seconds}}/{{plus|minus}} - Press a counter button");
    info!("  POST /start                         - Start the countdown");
    info!("  GET  /events                        - Screen updates (SSE)");
    info!("  GET  /status                        - Screen plus server metadata");
    info!("  GET  /health                        - Health check");

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

    if let Err(e) = state.teardown() {
        tracing::warn!("Failed to tear down countdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

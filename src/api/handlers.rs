//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::state::{AppState, Operation, ScreenSnapshot, TimeUnit};
use super::responses::{ApiResponse, HealthResponse, ScreenView, StatusResponse};

/// Handle GET /screen - Return the current render model
pub async fn screen_handler(State(state): State<Arc<AppState>>) -> Result<Json<ScreenView>, StatusCode> {
    match state.snapshot() {
        Ok(snapshot) => Ok(Json(ScreenView::from(&snapshot))),
        Err(e) => {
            error!("Failed to read screen state: {}", e);
            Err(e.status_code())
        }
    }
}

/// Handle POST /counters/:unit/:operation - Press a counter button
pub async fn counter_handler(
    State(state): State<Arc<AppState>>,
    Path((unit, operation)): Path<(TimeUnit, Operation)>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.adjust(unit, operation) {
        Ok(snapshot) => {
            let view = ScreenView::from(&snapshot);
            let counter = if unit == TimeUnit::Minutes { &view.minutes } else { &view.seconds };
            let message = format!("{} set to {}", counter.label, counter.text);
            Ok(Json(ApiResponse::idle(message, view)))
        }
        Err(e) => {
            warn!("Rejected {:?} {:?} press: {}", unit, operation, e);
            Err(e.status_code())
        }
    }
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start() {
        Ok(snapshot) => {
            let view = ScreenView::from(&snapshot);
            info!("Start endpoint called - countdown of {}ms running", view.total_duration_millis);
            Ok(Json(ApiResponse::running(
                format!("Countdown started for {} seconds", view.step_count),
                view,
            )))
        }
        Err(e) => {
            warn!("Rejected start: {}", e);
            Err(e.status_code())
        }
    }
}

/// Handle GET /events - Stream the render model on every change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    // The first poll yields the current screen, then one event per change
    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot: ScreenSnapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("screen")
            .json_data(ScreenView::from(&snapshot))
            .unwrap_or_else(|e| {
                warn!("Failed to encode screen event: {}", e);
                Event::default().event("error")
            });
        Some((Ok::<_, Infallible>(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return screen plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read screen state: {}", e);
            return Err(e.status_code());
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        screen: ScreenView::from(&snapshot),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

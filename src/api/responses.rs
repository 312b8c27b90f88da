//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{Counter, ScreenSnapshot},
    utils::make_time_text,
};

/// Label on the start button
pub const START_LABEL: &str = "START";

/// How one counter column is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterView {
    pub label: String,
    pub value: u32,
    pub text: String,
    pub show_increment: bool,
    pub show_decrement: bool,
}

impl From<&Counter> for CounterView {
    fn from(counter: &Counter) -> Self {
        Self {
            label: counter.unit().label().to_string(),
            value: counter.value(),
            text: make_time_text(counter.value()),
            show_increment: counter.can_increment(),
            show_decrement: counter.can_decrement(),
        }
    }
}

/// Render model of the whole countdown screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenView {
    pub minutes: CounterView,
    pub seconds: CounterView,
    pub progress: f32,
    pub is_running: bool,
    pub selector_visible: bool,
    pub start_visible: bool,
    pub start_enabled: bool,
    pub start_label: String,
    pub total_duration_millis: u64,
    pub step_count: u64,
    pub remaining_millis: Option<u64>,
}

impl From<&ScreenSnapshot> for ScreenView {
    fn from(snapshot: &ScreenSnapshot) -> Self {
        let screen = &snapshot.screen;
        // While running, duration comes from the captured countdown
        let (total, steps) = match &snapshot.countdown {
            Some(countdown) => (countdown.total_millis(), countdown.step_count()),
            None => (screen.total_duration_millis(), screen.step_count()),
        };

        Self {
            minutes: CounterView::from(&screen.minutes),
            seconds: CounterView::from(&screen.seconds),
            progress: screen.progress,
            is_running: screen.is_running,
            selector_visible: !screen.is_running,
            start_visible: !screen.is_running,
            start_enabled: screen.can_start(),
            start_label: START_LABEL.to_string(),
            total_duration_millis: total,
            step_count: steps,
            remaining_millis: snapshot.countdown.as_ref().map(|c| c.remaining_millis()),
        }
    }
}

/// API response structure for button presses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub screen: ScreenView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, screen: ScreenView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            screen,
        }
    }

    /// Response for a press that left the screen idle
    pub fn idle(message: String, screen: ScreenView) -> Self {
        Self::new("idle".to_string(), message, screen)
    }

    /// Response for a press that left a countdown running
    pub fn running(message: String, screen: ScreenView) -> Self {
        Self::new("running".to_string(), message, screen)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub screen: ScreenView,
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
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! Countdown Dial - A state-managed HTTP server exposing a countdown screen
//!
//! This library provides a minutes/seconds duration selector, a tick-driven
//! countdown engine and the HTTP surface that presents them.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::ScreenError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;

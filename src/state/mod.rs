//! State management module
//!
//! This module contains the countdown screen's state and its owner.

pub mod counter;
pub mod screen_state;
pub mod app_state;

// Re-export main types
pub use counter::{Counter, Operation, TimeUnit, MAX_MINUTES, MAX_SECONDS};
pub use screen_state::{total_duration_millis, ScreenState, PROGRESS_SENTINEL};
pub use app_state::{AppState, ScreenSnapshot};

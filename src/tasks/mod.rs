//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod progress_logger;

// Re-export main functions
pub use progress_logger::progress_logger_task;

//! Errors raised by screen operations

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// Counters are hidden and start is unreachable while a countdown runs
    #[error("a countdown is already running")]
    Running,

    /// Start pressed with both counters at zero
    #[error("cannot start a countdown of zero duration")]
    ZeroDuration,

    #[error("screen state lock poisoned: {0}")]
    StatePoisoned(String),
}

impl ScreenError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScreenError::Running => StatusCode::CONFLICT,
            ScreenError::ZeroDuration => StatusCode::UNPROCESSABLE_ENTITY,
            ScreenError::StatePoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ScreenError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ScreenError::StatePoisoned(e.to_string())
    }
}

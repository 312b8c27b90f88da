//! Screen state structure and its pure transitions

use serde::Serialize;

use super::counter::{Counter, Operation, TimeUnit};
use crate::{error::ScreenError, services::countdown::Countdown};

/// Progress shown while idle. Kept above zero so the indicator stays drawn.
pub const PROGRESS_SENTINEL: f32 = 0.0001;

/// Total duration for a selection, in milliseconds
pub fn total_duration_millis(minutes: u32, seconds: u32) -> u64 {
    (u64::from(minutes) * 60 + u64::from(seconds)) * 1000
}

/// Everything the countdown screen shows.
///
/// Transitions take `&self` and return a new state; the owner decides when
/// to publish it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenState {
    pub minutes: Counter,
    pub seconds: Counter,
    pub progress: f32,
    pub is_running: bool,
}

impl ScreenState {
    /// Idle screen with both counters at zero
    pub fn new() -> Self {
        Self {
            minutes: Counter::new(TimeUnit::Minutes),
            seconds: Counter::new(TimeUnit::Seconds),
            progress: PROGRESS_SENTINEL,
            is_running: false,
        }
    }

    pub fn counter(&self, unit: TimeUnit) -> &Counter {
        match unit {
            TimeUnit::Minutes => &self.minutes,
            TimeUnit::Seconds => &self.seconds,
        }
    }

    pub fn total_duration_millis(&self) -> u64 {
        total_duration_millis(self.minutes.value(), self.seconds.value())
    }

    /// Expected number of one-second ticks
    pub fn step_count(&self) -> u64 {
        self.total_duration_millis() / 1000
    }

    /// Start is offered only while idle with a non-zero selection
    pub fn can_start(&self) -> bool {
        !self.is_running && self.total_duration_millis() > 0
    }

    /// Press a counter button
    pub fn adjust(&self, unit: TimeUnit, operation: Operation) -> Result<Self, ScreenError> {
        if self.is_running {
            return Err(ScreenError::Running);
        }
        let mut next = *self;
        match unit {
            TimeUnit::Minutes => next.minutes = self.minutes.apply(operation),
            TimeUnit::Seconds => next.seconds = self.seconds.apply(operation),
        }
        Ok(next)
    }

    /// Enter the running state, capturing the countdown parameters
    pub fn start(&self) -> Result<(Self, Countdown), ScreenError> {
        if self.is_running {
            return Err(ScreenError::Running);
        }
        let total = self.total_duration_millis();
        if total == 0 {
            return Err(ScreenError::ZeroDuration);
        }
        let mut next = *self;
        next.is_running = true;
        Ok((next, Countdown::new(total)))
    }

    /// Advance progress by one tick's share
    pub fn apply_tick(&self, increment: f32) -> Self {
        let mut next = *self;
        next.progress += increment;
        next
    }

    /// Countdown elapsed: progress pinned to exactly 1
    pub fn complete(&self) -> Self {
        let mut next = *self;
        next.progress = 1.0;
        next
    }

    /// Back to the idle selector with zeroed counters
    pub fn reset(&self) -> Self {
        Self::new()
    }
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::new()
    }
}

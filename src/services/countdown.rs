//! Countdown engine: turns a fixed duration into a sequence of ticks
//!
//! The engine is fired once immediately and then once per [`TICK_INTERVAL`].
//! For a duration of `n` whole seconds the first `n` fires are progress ticks
//! and fire `n` (at `t = n` seconds) is the finish.

use std::time::Duration;

/// Interval between scheduler fires
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What a single scheduler fire means for the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownEvent {
    /// Add `increment` to the progress fraction
    Tick { increment: f32 },
    /// Countdown elapsed; force progress to 1 and reset
    Finished,
}

/// Parameters captured when a countdown starts, plus how far it has run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total_millis: u64,
    step_count: u64,
    fired: u64,
}

impl Countdown {
    /// Build a countdown for `total_millis`.
    ///
    /// Callers gate on a non-zero duration; a zero step count finishes on
    /// the first fire instead of dividing by zero.
    pub fn new(total_millis: u64) -> Self {
        Self {
            total_millis,
            step_count: total_millis / TICK_INTERVAL.as_millis() as u64,
            fired: 0,
        }
    }

    pub fn total_millis(&self) -> u64 {
        self.total_millis
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Progress ticks delivered so far
    pub fn ticks_elapsed(&self) -> u64 {
        self.fired.min(self.step_count)
    }

    /// Milliseconds left according to delivered ticks, not wall clock
    pub fn remaining_millis(&self) -> u64 {
        let elapsed = self.fired.saturating_sub(1) * TICK_INTERVAL.as_millis() as u64;
        if self.is_finished() {
            0
        } else {
            self.total_millis.saturating_sub(elapsed)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.fired > self.step_count
    }

    /// Consume one scheduler fire
    pub fn advance(&mut self) -> CountdownEvent {
        if self.is_finished() {
            return CountdownEvent::Finished;
        }
        let index = self.fired;
        self.fired += 1;
        if index < self.step_count {
            CountdownEvent::Tick {
                increment: (1.0 / self.step_count as f64) as f32,
            }
        } else {
            CountdownEvent::Finished
        }
    }
}

//! Countdown engine and the timer facility that drives it

pub mod countdown;
pub mod scheduler;

// Re-export main types
pub use countdown::{Countdown, CountdownEvent, TICK_INTERVAL};
pub use scheduler::{ManualScheduler, Scheduler, TickControl, TickFn, TickHandle, TokioScheduler};

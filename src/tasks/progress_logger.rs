//! Background task that logs screen transitions

use std::sync::Arc;
use tracing::{debug, info};

use crate::state::{AppState, ScreenSnapshot};

/// What changed between two published snapshots
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Started { total_millis: u64 },
    Progressed { progress: f32 },
    Completed,
    Reset,
    Edited { total_millis: u64 },
    Unchanged,
}

/// Classify the move from `prev` to `next`
pub fn classify(prev: &ScreenSnapshot, next: &ScreenSnapshot) -> Transition {
    let (before, after) = (&prev.screen, &next.screen);
    match (before.is_running, after.is_running) {
        (false, true) => Transition::Started {
            total_millis: after.total_duration_millis(),
        },
        (true, true) if next.countdown.as_ref().is_some_and(|c| c.is_finished()) => {
            Transition::Completed
        }
        (true, true) if after.progress != before.progress => Transition::Progressed {
            progress: after.progress,
        },
        (true, false) => Transition::Reset,
        (false, false) if after.total_duration_millis() != before.total_duration_millis() => {
            Transition::Edited {
                total_millis: after.total_duration_millis(),
            }
        }
        _ => Transition::Unchanged,
    }
}

/// Follow the screen's watch channel and log what happens.
///
/// Runs until the sending side is dropped.
pub async fn progress_logger_task(state: Arc<AppState>) {
    info!("Starting progress logger task");

    let mut rx = state.subscribe();
    let mut prev = rx.borrow_and_update().clone();

    while rx.changed().await.is_ok() {
        let next = rx.borrow_and_update().clone();
        match classify(&prev, &next) {
            Transition::Started { total_millis } => info!("Countdown running for {}ms", total_millis),
            Transition::Progressed { progress } => debug!("progress {}", progress),
            Transition::Completed => info!("Countdown complete"),
            Transition::Reset => info!("Screen reset to selector"),
            Transition::Edited { total_millis } => debug!("Selected duration now {}ms", total_millis),
            Transition::Unchanged => {}
        }
        prev = next;
    }

    debug!("Screen channel closed, progress logger exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::countdown::CountdownEvent;
    use crate::state::{Operation, ScreenState, TimeUnit};

    fn snap(screen: ScreenState) -> ScreenSnapshot {
        ScreenSnapshot { screen, countdown: None }
    }

    #[test]
    fn detects_start_tick_and_reset() {
        let idle = ScreenState::new().adjust(TimeUnit::Seconds, Operation::Plus).unwrap();
        let (running, countdown) = idle.start().unwrap();
        let running = ScreenSnapshot { screen: running, countdown: Some(countdown) };

        assert_eq!(
            classify(&snap(idle), &running),
            Transition::Started { total_millis: 1_000 }
        );

        let ticked = ScreenSnapshot {
            screen: running.screen.apply_tick(0.5),
            countdown: running.countdown.clone(),
        };
        assert!(matches!(classify(&running, &ticked), Transition::Progressed { .. }));
        assert_eq!(classify(&ticked, &snap(ScreenState::new())), Transition::Reset);
    }

    #[test]
    fn detects_completion_on_final_fire() {
        let idle = ScreenState::new().adjust(TimeUnit::Seconds, Operation::Plus).unwrap();
        let (running, mut countdown) = idle.start().unwrap();
        let CountdownEvent::Tick { increment } = countdown.advance() else {
            panic!("first fire of a one second countdown is a tick");
        };
        let ticked = ScreenSnapshot {
            screen: running.apply_tick(increment),
            countdown: Some(countdown.clone()),
        };

        assert_eq!(countdown.advance(), CountdownEvent::Finished);
        let completed = ScreenSnapshot {
            screen: ticked.screen.complete(),
            countdown: Some(countdown),
        };
        assert_eq!(classify(&ticked, &completed), Transition::Completed);
        assert_eq!(classify(&completed, &snap(ScreenState::new())), Transition::Reset);
    }

    #[test]
    fn detects_edits() {
        let idle = ScreenState::new();
        let edited = idle.adjust(TimeUnit::Minutes, Operation::Plus).unwrap();
        assert_eq!(
            classify(&snap(idle), &snap(edited)),
            Transition::Edited { total_millis: 60_000 }
        );
        assert_eq!(classify(&snap(idle), &snap(idle)), Transition::Unchanged);
    }
}

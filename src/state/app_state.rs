//! Main application state: the screen, its running countdown and the ticker

use std::{
    sync::{Arc, Mutex, Weak},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Operation, ScreenState, TimeUnit};
use crate::{
    error::ScreenError,
    services::{
        countdown::{Countdown, CountdownEvent, TICK_INTERVAL},
        scheduler::{Scheduler, TickControl, TickHandle},
    },
};

/// Screen plus the countdown driving it, guarded together
#[derive(Debug, Default)]
struct Session {
    screen: ScreenState,
    countdown: Option<Countdown>,
    ticker: Option<TickHandle>,
}

/// Published after every change
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSnapshot {
    pub screen: ScreenState,
    pub countdown: Option<Countdown>,
}

/// Main application state that owns the countdown screen
pub struct AppState {
    session: Mutex<Session>,
    scheduler: Arc<dyn Scheduler>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for screen updates
    pub screen_tx: watch::Sender<ScreenSnapshot>,
}

impl AppState {
    /// Create a new AppState with an idle screen
    pub fn new(port: u16, host: String, scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        let (screen_tx, _) = watch::channel(ScreenSnapshot {
            screen: ScreenState::new(),
            countdown: None,
        });

        Arc::new(Self {
            session: Mutex::new(Session::default()),
            scheduler,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            screen_tx,
        })
    }

    /// Subscribe to screen changes
    pub fn subscribe(&self) -> watch::Receiver<ScreenSnapshot> {
        self.screen_tx.subscribe()
    }

    /// Current screen and countdown
    pub fn snapshot(&self) -> Result<ScreenSnapshot, ScreenError> {
        let session = self.session.lock()?;
        Ok(Self::snapshot_of(&session))
    }

    /// Press a counter button
    pub fn adjust(&self, unit: TimeUnit, operation: Operation) -> Result<ScreenSnapshot, ScreenError> {
        let mut session = self.session.lock()?;
        session.screen = session.screen.adjust(unit, operation)?;
        let snapshot = self.publish(&session);
        drop(session);

        debug!(
            "Counter {:?} {:?} -> {} ({}ms total)",
            unit,
            operation,
            snapshot.screen.counter(unit).value(),
            snapshot.screen.total_duration_millis()
        );
        self.record_action(&format!("{:?}-{:?}", unit, operation).to_lowercase());
        Ok(snapshot)
    }

    /// Press start: begin ticking the current selection
    pub fn start(self: &Arc<Self>) -> Result<ScreenSnapshot, ScreenError> {
        let mut session = self.session.lock()?;
        let (screen, countdown) = session.screen.start()?;
        info!(
            "Starting countdown of {}ms ({} steps)",
            countdown.total_millis(),
            countdown.step_count()
        );
        session.screen = screen;
        session.countdown = Some(countdown);

        // Registered under the session lock so the handle is stored before
        // the first tick can touch the session.
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = self.scheduler.schedule_repeating(
            TICK_INTERVAL,
            Box::new(move || match weak.upgrade() {
                Some(state) => state.on_tick(),
                None => TickControl::Stop,
            }),
        );
        session.ticker = Some(handle);
        let snapshot = self.publish(&session);
        drop(session);

        self.record_action("start");
        Ok(snapshot)
    }

    /// Scheduler callback: one fire of the running countdown
    fn on_tick(&self) -> TickControl {
        let mut session = match self.session.lock() {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to lock screen state on tick: {}", e);
                return TickControl::Stop;
            }
        };

        let Some(event) = session.countdown.as_mut().map(Countdown::advance) else {
            return TickControl::Stop;
        };

        match event {
            CountdownEvent::Tick { increment } => {
                session.screen = session.screen.apply_tick(increment);
                self.publish(&session);
                TickControl::Continue
            }
            CountdownEvent::Finished => {
                session.screen = session.screen.complete();
                self.publish(&session);

                session.screen = session.screen.reset();
                session.countdown = None;
                session.ticker = None;
                self.publish(&session);
                drop(session);

                info!("Countdown finished, screen reset");
                self.record_action("finish");
                TickControl::Stop
            }
        }
    }

    /// Cancel any running countdown and return to the idle screen
    pub fn teardown(&self) -> Result<(), ScreenError> {
        let mut session = self.session.lock()?;
        if let Some(handle) = session.ticker.take() {
            self.scheduler.cancel(handle);
            info!("Cancelled running countdown on teardown");
        }
        session.countdown = None;
        session.screen = session.screen.reset();
        self.publish(&session);
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, session: &Session) -> ScreenSnapshot {
        let snapshot = Self::snapshot_of(session);
        // send_replace never fails, even with no receivers
        self.screen_tx.send_replace(snapshot.clone());
        snapshot
    }

    fn snapshot_of(session: &Session) -> ScreenSnapshot {
        ScreenSnapshot {
            screen: session.screen,
            countdown: session.countdown.clone(),
        }
    }
}

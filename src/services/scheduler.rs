//! Repeating-timer capability
//!
//! [`TokioScheduler`] drives callbacks from `tokio::time::interval`;
//! [`ManualScheduler`] fires them from virtual time so tests do not depend
//! on wall-clock delivery.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::{
    task::AbortHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Returned by a tick callback to keep or stop its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Callback invoked on every fire
pub type TickFn = Box<dyn FnMut() -> TickControl + Send + 'static>;

/// Identifies a repeating schedule for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A source of repeating ticks.
///
/// Implementations fire `on_tick` once immediately and then every `period`
/// until it returns [`TickControl::Stop`] or the handle is cancelled. They
/// must not invoke `on_tick` from inside `schedule_repeating`.
pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, period: Duration, on_tick: TickFn) -> TickHandle;

    /// Stop a schedule. Cancelling a finished schedule is a no-op.
    fn cancel(&self, handle: TickHandle);
}

/// Scheduler backed by the tokio runtime
#[derive(Debug, Default)]
pub struct TokioScheduler {
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schedules still running
    pub fn active_count(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, mut on_tick: TickFn) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Holding the map lock across spawn keeps the task from removing
        // its entry before it has been inserted.
        let mut guard = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if on_tick() == TickControl::Stop {
                    debug!("Schedule {} stopped by its callback", id);
                    break;
                }
            }
            match tasks.lock() {
                Ok(mut tasks) => {
                    tasks.remove(&id);
                }
                Err(e) => warn!("Failed to lock scheduler tasks: {}", e),
            }
        });
        guard.insert(id, task.abort_handle());
        drop(guard);

        debug!("Scheduled repeating tick {} every {:?}", id, period);
        TickHandle(id)
    }

    fn cancel(&self, handle: TickHandle) {
        let removed = match self.tasks.lock() {
            Ok(mut tasks) => tasks.remove(&handle.0),
            Err(e) => {
                warn!("Failed to lock scheduler tasks: {}", e);
                None
            }
        };
        if let Some(task) = removed {
            task.abort();
            debug!("Cancelled repeating tick {}", handle.0);
        }
    }
}

struct ManualEntry {
    period: Duration,
    next_due: Duration,
    on_tick: TickFn,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    entries: HashMap<u64, ManualEntry>,
    /// Schedule whose callback is running; cleared if cancelled meanwhile
    in_flight: Option<u64>,
}

/// Deterministic scheduler advanced by hand.
///
/// Callbacks run on the thread calling [`ManualScheduler::advance`], outside
/// the scheduler's own lock, so they may schedule or cancel freely.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of schedules still registered
    pub fn active_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Move virtual time forward by `by`, firing every tick that falls due
    /// in order. Returns the number of callbacks invoked.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            // Earliest due entry, lowest id first on ties
            let next = {
                let inner = self.lock();
                inner
                    .entries
                    .iter()
                    .filter(|(_, entry)| entry.next_due <= target)
                    .min_by_key(|(id, entry)| (entry.next_due, **id))
                    .map(|(id, entry)| (*id, entry.next_due))
            };
            let Some((id, due)) = next else { break };

            let mut entry = {
                let mut inner = self.lock();
                inner.now = due;
                match inner.entries.remove(&id) {
                    Some(entry) => {
                        inner.in_flight = Some(id);
                        entry
                    }
                    None => continue,
                }
            };

            fired += 1;
            let control = (entry.on_tick)();
            let mut inner = self.lock();
            let still_scheduled = inner.in_flight.take() == Some(id);
            if control == TickControl::Continue && still_scheduled {
                entry.next_due = due + entry.period;
                inner.entries.insert(id, entry);
            }
        }

        self.lock().now = target;
        fired
    }

    /// Fire whatever is due right now without moving time
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, on_tick: TickFn) -> TickHandle {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let next_due = inner.now;
        inner.entries.insert(id, ManualEntry { period, next_due, on_tick });
        TickHandle(id)
    }

    fn cancel(&self, handle: TickHandle) {
        let mut inner = self.lock();
        if inner.entries.remove(&handle.0).is_none() && inner.in_flight == Some(handle.0) {
            inner.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(limit: usize) -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let on_tick: TickFn = Box::new(move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= limit { TickControl::Stop } else { TickControl::Continue }
        });
        (count, on_tick)
    }

    #[test]
    fn manual_fires_immediately_then_each_period() {
        let scheduler = ManualScheduler::new();
        let (count, on_tick) = counting(usize::MAX);
        scheduler.schedule_repeating(Duration::from_secs(1), on_tick);

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(999)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(scheduler.advance(Duration::from_secs(3)), 3);
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert_eq!(scheduler.now(), Duration::from_secs(4));
    }

    #[test]
    fn manual_stops_when_callback_says_so() {
        let scheduler = ManualScheduler::new();
        let (count, on_tick) = counting(3);
        scheduler.schedule_repeating(Duration::from_secs(1), on_tick);

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn manual_cancel_removes_schedule() {
        let scheduler = ManualScheduler::new();
        let (count, on_tick) = counting(usize::MAX);
        let handle = scheduler.schedule_repeating(Duration::from_secs(1), on_tick);

        scheduler.advance(Duration::from_secs(1));
        scheduler.cancel(handle);
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        scheduler.cancel(handle);
    }

    #[test]
    fn manual_cancel_from_inside_callback_sticks() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let own_handle: Arc<Mutex<Option<TickHandle>>> = Arc::new(Mutex::new(None));

        let seen = Arc::clone(&count);
        let slot = Arc::clone(&own_handle);
        let canceller = scheduler.clone();
        let handle = scheduler.schedule_repeating(
            Duration::from_secs(1),
            Box::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                if let Some(handle) = *slot.lock().unwrap() {
                    canceller.cancel(handle);
                }
                TickControl::Continue
            }),
        );
        *own_handle.lock().unwrap() = Some(handle);

        assert_eq!(scheduler.advance(Duration::from_secs(5)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn manual_callback_can_cancel_another_schedule() {
        let scheduler = ManualScheduler::new();
        let (victim_count, victim) = counting(usize::MAX);
        let victim_handle = scheduler.schedule_repeating(Duration::from_secs(1), victim);

        let (killer_count, mut killer_inner) = counting(usize::MAX);
        let canceller = scheduler.clone();
        scheduler.schedule_repeating(
            Duration::from_secs(1),
            Box::new(move || {
                canceller.cancel(victim_handle);
                killer_inner()
            }),
        );

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(victim_count.load(Ordering::SeqCst), 1);
        assert_eq!(killer_count.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_ticks_until_stopped() {
        let scheduler = TokioScheduler::new();
        let (count, on_tick) = counting(4);
        scheduler.schedule_repeating(Duration::from_secs(1), on_tick);

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_cancel_aborts_task() {
        let scheduler = TokioScheduler::new();
        let (count, on_tick) = counting(usize::MAX);
        let handle = scheduler.schedule_repeating(Duration::from_secs(1), on_tick);

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        scheduler.cancel(handle);
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 2);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert_eq!(scheduler.active_count(), 0);
    }
}

//! Repeating timers on a virtual clock
//!
//! The session never reads wall-clock time. Drivers advance the scheduler
//! (by measured frame time in the browser, by fixed steps natively and in
//! tests) and dispatch each due timer one at a time, so a callback can
//! cancel timers that would otherwise fire later in the same advance.

use std::time::Duration;

/// Shortest allowed repeat period
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Cancel handle for a repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Schedule repeating tasks and fire them in deadline order
pub trait Scheduler {
    /// Current virtual time
    fn now(&self) -> Duration;

    /// Arm a repeating timer. The first firing is one `every` from now.
    fn schedule_repeating(&mut self, every: Duration) -> TimerHandle;

    /// Cancel a timer. Returns false if it was not active.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Whether a timer is still armed
    fn is_active(&self, handle: TimerHandle) -> bool;

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline and re-arming it for its next period.
    fn fire_next(&mut self, until: Duration) -> Option<TimerHandle>;

    /// Move the clock forward to `until` without firing anything
    fn advance_to(&mut self, until: Duration);
}

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    every: Duration,
    next_due: Duration,
}

/// Scheduler driven entirely by its caller
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now: Duration,
    timers: Vec<Timer>,
    next_id: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed timers
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Period of an armed timer
    pub fn period(&self, handle: TimerHandle) -> Option<Duration> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.every)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating(&mut self, every: Duration) -> TimerHandle {
        let every = every.max(MIN_PERIOD);
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            every,
            next_due: self.now + every,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    fn fire_next(&mut self, until: Duration) -> Option<TimerHandle> {
        // Ties break on handle so older timers fire first
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due <= until)
            .min_by_key(|t| (t.next_due, t.handle))?;

        self.now = self.now.max(timer.next_due);
        timer.next_due += timer.every;
        Some(timer.handle)
    }

    fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

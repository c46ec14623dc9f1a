//! One-second countdown for a running session

use super::state::{Session, SessionStatus};
use crate::consts::CLOCK_PERIOD;
use crate::scheduler::{Scheduler, TimerHandle};

/// What a clock firing did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    Ticked { seconds_remaining: u32 },
    /// Countdown reached zero, the session is now over
    Expired,
    /// Session was already over, nothing changed
    Idle,
}

#[derive(Debug, Default)]
pub struct SessionClock {
    timer: Option<TimerHandle>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Arm a fresh timer, cancelling any previous one
    pub fn start(&mut self, scheduler: &mut impl Scheduler) {
        self.stop(scheduler);
        self.timer = Some(scheduler.schedule_repeating(CLOCK_PERIOD));
    }

    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }

    /// Apply one firing. Stops the clock for good when the countdown expires.
    pub fn fire(&mut self, session: &mut Session, scheduler: &mut impl Scheduler) -> ClockOutcome {
        if session.is_over() {
            self.stop(scheduler);
            return ClockOutcome::Idle;
        }

        if session.seconds_remaining <= 1 {
            session.seconds_remaining = 0;
            session.status = SessionStatus::Over;
            self.stop(scheduler);
            ClockOutcome::Expired
        } else {
            session.seconds_remaining -= 1;
            ClockOutcome::Ticked {
                seconds_remaining: session.seconds_remaining,
            }
        }
    }
}

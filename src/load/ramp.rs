use std::time::Duration;

/// Spacing between ramp-up steps.
pub const RAMP_TICK: Duration = Duration::from_secs(1);

/// One ramp step: how many users to start `at` this offset from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampStep {
    pub at: Duration,
    pub spawn: usize,
}

/// Linear ramp from zero to `max_users` over `ramp_up`.
///
/// Each step targets `floor(max_users * elapsed / ramp_up)` users in total
/// and starts the difference to the users already running, so fractional
/// rates carry over between steps instead of being lost. The final step
/// lands exactly on `ramp_up` and tops the count up to `max_users`.
#[derive(Debug, Clone)]
pub struct RampSchedule {
    max_users: usize,
    ramp_up: Duration,
    tick: Duration,
    next_at: Duration,
    started: usize,
    done: bool,
}

impl RampSchedule {
    #[must_use]
    pub fn new(max_users: usize, ramp_up: Duration) -> Self {
        Self::with_tick(max_users, ramp_up, RAMP_TICK)
    }

    #[must_use]
    pub fn with_tick(max_users: usize, ramp_up: Duration, tick: Duration) -> Self {
        let tick = if tick.is_zero() { RAMP_TICK } else { tick };
        Self {
            max_users,
            ramp_up,
            tick,
            next_at: if ramp_up.is_zero() { Duration::ZERO } else { tick.min(ramp_up) },
            started: 0,
            done: max_users == 0,
        }
    }

    /// Users the schedule calls for at `elapsed` since the start.
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> usize {
        if elapsed >= self.ramp_up {
            return self.max_users;
        }
        let scaled = u128::try_from(self.max_users)
            .unwrap_or(u128::MAX)
            .saturating_mul(elapsed.as_nanos())
            .checked_div(self.ramp_up.as_nanos())
            .unwrap_or(0);
        usize::try_from(scaled).unwrap_or(self.max_users).min(self.max_users)
    }
}

impl Iterator for RampSchedule {
    type Item = RampStep;

    fn next(&mut self) -> Option<RampStep> {
        while !self.done {
            let at = self.next_at;
            let target = self.target_at(at);
            let spawn = target.saturating_sub(self.started);
            self.started = target;
            if at >= self.ramp_up || self.started >= self.max_users {
                self.done = true;
            } else {
                self.next_at = at.saturating_add(self.tick).min(self.ramp_up);
            }
            if spawn > 0 {
                return Some(RampStep { at, spawn });
            }
        }
        None
    }
}

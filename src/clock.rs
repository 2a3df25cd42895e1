//! Wall-clock timestamps derived from the tokio monotonic clock.
//!
//! Result records carry `DateTime<Utc>` stamps, while every duration and
//! deadline is measured with `tokio::time::Instant`. Anchoring one to the
//! other keeps `finished_at - started_at == duration` exact and keeps the
//! stamps consistent when the tokio clock is paused in tests.
use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl WallClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor_wall: Utc::now(),
            anchor: Instant::now(),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.at(Instant::now())
    }

    #[must_use]
    pub fn at(&self, instant: Instant) -> DateTime<Utc> {
        if instant >= self.anchor {
            let delta = to_delta(instant.duration_since(self.anchor));
            self.anchor_wall
                .checked_add_signed(delta)
                .unwrap_or(self.anchor_wall)
        } else {
            let delta = to_delta(self.anchor.duration_since(instant));
            self.anchor_wall
                .checked_sub_signed(delta)
                .unwrap_or(self.anchor_wall)
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

fn to_delta(duration: std::time::Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

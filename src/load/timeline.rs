use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::clock::WallClock;
use crate::domain::TimelinePoint;
use crate::metrics::rate_percent;

use super::live::LiveCounters;

/// Samples the live counters every `every` until the deadline passes or
/// a shutdown arrives. Never writes to the counters.
pub async fn sample_timeline(
    counters: Arc<LiveCounters>,
    clock: WallClock,
    start: Instant,
    deadline: Instant,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Vec<TimelinePoint> {
    let mut points = Vec::new();
    let Some(first) = start.checked_add(every) else {
        return points;
    };
    let mut ticker = interval_at(first, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let tick = tokio::select! {
            tick = ticker.tick() => tick,
            _ = shutdown.recv() => break,
        };
        if tick > deadline {
            break;
        }
        points.push(timeline_point(&counters, &clock, start, tick));
    }
    points
}

#[must_use]
pub fn timeline_point(
    counters: &LiveCounters,
    clock: &WallClock,
    start: Instant,
    at: Instant,
) -> TimelinePoint {
    let snapshot = counters.snapshot();
    let elapsed = at.duration_since(start);
    let requests_per_sec = if elapsed.is_zero() {
        0.0
    } else {
        snapshot.total_requests as f64 / elapsed.as_secs_f64()
    };
    TimelinePoint {
        timestamp: clock.at(at),
        elapsed,
        active_users: snapshot.active_users,
        requests_per_sec,
        avg_response_time: snapshot.avg_response_time,
        error_rate: rate_percent(snapshot.failed_requests, snapshot.total_requests),
    }
}

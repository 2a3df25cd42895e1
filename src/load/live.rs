use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Running totals of a load test.
///
/// Only the result aggregator and the user guards write; the timeline
/// sampler reads.
#[derive(Debug, Default)]
pub struct LiveCounters {
    active_users: AtomicUsize,
    peak_users: AtomicUsize,
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    latency_nanos: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveSnapshot {
    pub active_users: usize,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub avg_response_time: Duration,
}

impl LiveCounters {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, duration: Duration, failed: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        // Saturate instead of wrapping around.
        let mut current = self.latency_nanos.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_add(nanos);
            match self.latency_nanos.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    #[must_use]
    pub fn active_users(&self) -> usize {
        self.active_users.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn peak_users(&self) -> usize {
        self.peak_users.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> LiveSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let latency = self.latency_nanos.load(Ordering::Relaxed);
        LiveSnapshot {
            active_users: self.active_users(),
            total_requests,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_response_time: Duration::from_nanos(
                latency.checked_div(total_requests).unwrap_or(0),
            ),
        }
    }
}

/// Marks one virtual user as active for as long as it is held.
pub struct ActiveUserGuard<'counter> {
    counter: &'counter AtomicUsize,
}

impl<'counter> ActiveUserGuard<'counter> {
    #[must_use]
    pub fn enter(counters: &'counter LiveCounters) -> Self {
        let now = counters
            .active_users
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        counters.peak_users.fetch_max(now, Ordering::Relaxed);
        Self {
            counter: &counters.active_users,
        }
    }
}

impl Drop for ActiveUserGuard<'_> {
    fn drop(&mut self) {
        loop {
            let current = self.counter.load(Ordering::Relaxed);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .counter
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }
    }
}

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{
    AlertKind, DowntimeIncident, MonitorAlert, MonitorCheck, MonitorConfig, MonitorStats,
    MonitorStatus, UptimeMetric, UptimePeriod, UptimeReport, new_id,
};
use crate::metrics::{mean, rate_percent};

use super::check::CheckOutcome;

/// Checks that decide the current status.
pub const RECENT_CHECKS: usize = 50;
/// Window of the error-rate alert.
pub const ERROR_RATE_WINDOW: Duration = Duration::from_secs(10 * 60);
pub const ERROR_RATE_THRESHOLD: f64 = 50.0;
const UP_THRESHOLD: f64 = 90.0;
const DEGRADED_THRESHOLD: f64 = 50.0;

/// Everything recorded for one monitor: checks oldest first, alerts in
/// the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct MonitorHistory {
    checks: Vec<MonitorCheck>,
    alerts: Vec<MonitorAlert>,
}

impl MonitorHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn checks(&self) -> &[MonitorCheck] {
        &self.checks
    }

    /// Alerts, newest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<MonitorAlert> {
        self.alerts.iter().rev().cloned().collect()
    }

    /// Stores a check, then raises or resolves alerts for it. Returns the
    /// alerts raised by this check.
    pub fn record(&mut self, config: &MonitorConfig, outcome: CheckOutcome) -> Vec<MonitorAlert> {
        let now = outcome.check.checked_at;
        let check = outcome.check;
        let mut raised = Vec::new();

        if outcome.unreachable {
            let reason = check.error.as_deref().unwrap_or("unreachable");
            raised.extend(self.raise(
                config,
                AlertKind::Downtime,
                format!("Monitor check failed: {}", reason),
                now,
            ));
        } else if check.success {
            self.resolve(AlertKind::Downtime, now);
        }

        if check.response_time > config.slow_threshold {
            raised.extend(self.raise(
                config,
                AlertKind::SlowResponse,
                format!(
                    "Slow response detected: {}ms",
                    check.response_time.as_millis()
                ),
                now,
            ));
        } else {
            self.resolve(AlertKind::SlowResponse, now);
        }

        let success = check.success;
        self.checks.push(check);
        self.trim(now);

        let error_rate = self.error_rate_since(window_start(now, ERROR_RATE_WINDOW));
        if !success && error_rate > ERROR_RATE_THRESHOLD {
            raised.extend(self.raise(
                config,
                AlertKind::ErrorRate,
                format!("High error rate detected: {:.1}%", error_rate),
                now,
            ));
        } else if success && error_rate <= ERROR_RATE_THRESHOLD {
            self.resolve(AlertKind::ErrorRate, now);
        }
        raised
    }

    /// Failed share of the checks at or after `since`, in percent.
    #[must_use]
    pub fn error_rate_since(&self, since: DateTime<Utc>) -> f64 {
        let recent = self.checks.iter().filter(|check| check.checked_at >= since);
        let (total, failed) = recent.fold((0u64, 0u64), |(total, failed), check| {
            (
                total.saturating_add(1),
                failed.saturating_add(u64::from(!check.success)),
            )
        });
        rate_percent(failed, total)
    }

    #[must_use]
    pub fn stats(&self, monitor_id: &str) -> MonitorStats {
        let total = u64::try_from(self.checks.len()).unwrap_or(u64::MAX);
        let successful = count_successful(&self.checks);
        let times: Vec<Duration> = self.checks.iter().map(|check| check.response_time).collect();
        let recent_checks: Vec<MonitorCheck> =
            self.checks.iter().rev().take(RECENT_CHECKS).cloned().collect();

        MonitorStats {
            monitor_id: monitor_id.to_owned(),
            total_checks: total,
            successful_checks: successful,
            failed_checks: total.saturating_sub(successful),
            avg_response_time: mean(&times),
            uptime: rate_percent(successful, total),
            last_check: self.checks.last().map(|check| check.checked_at),
            status: status_of(&recent_checks),
            recent_checks,
        }
    }

    #[must_use]
    pub fn uptime_report(
        &self,
        monitor_id: &str,
        period: UptimePeriod,
        now: DateTime<Utc>,
    ) -> UptimeReport {
        let since = window_start(now, period.window());
        let checks: Vec<&MonitorCheck> = self
            .checks
            .iter()
            .filter(|check| check.checked_at >= since)
            .collect();
        let total = u64::try_from(checks.len()).unwrap_or(u64::MAX);
        let successful = u64::try_from(checks.iter().filter(|check| check.success).count())
            .unwrap_or(u64::MAX);

        UptimeReport {
            monitor_id: monitor_id.to_owned(),
            period,
            overall_uptime: rate_percent(successful, total),
            total_checks: total,
            incidents: downtime_incidents(&checks, now),
            metrics: checks
                .iter()
                .map(|check| UptimeMetric {
                    timestamp: check.checked_at,
                    status_code: check.status_code,
                    response_time: check.response_time,
                    success: check.success,
                })
                .collect(),
        }
    }

    fn raise(
        &mut self,
        config: &MonitorConfig,
        kind: AlertKind,
        message: String,
        now: DateTime<Utc>,
    ) -> Option<MonitorAlert> {
        if self
            .alerts
            .iter()
            .any(|alert| alert.kind == kind && !alert.is_resolved())
        {
            return None;
        }
        let alert = MonitorAlert {
            id: new_id(),
            monitor_id: config.id.clone(),
            kind,
            message,
            severity: kind.severity(),
            triggered_at: now,
            resolved_at: None,
        };
        self.alerts.push(alert.clone());
        Some(alert)
    }

    fn resolve(&mut self, kind: AlertKind, now: DateTime<Utc>) {
        for alert in &mut self.alerts {
            if alert.kind == kind && alert.resolved_at.is_none() {
                alert.resolved_at = Some(now);
            }
        }
    }

    /// Drops checks older than the longest report period.
    fn trim(&mut self, now: DateTime<Utc>) {
        let horizon = window_start(now, UptimePeriod::Month.window());
        self.checks.retain(|check| check.checked_at >= horizon);
    }
}

fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn count_successful(checks: &[MonitorCheck]) -> u64 {
    u64::try_from(checks.iter().filter(|check| check.success).count()).unwrap_or(u64::MAX)
}

/// Status from the success rate of `recent` checks.
#[must_use]
pub fn status_of(recent: &[MonitorCheck]) -> MonitorStatus {
    if recent.is_empty() {
        return MonitorStatus::Unknown;
    }
    let rate = rate_percent(
        count_successful(recent),
        u64::try_from(recent.len()).unwrap_or(u64::MAX),
    );
    if rate >= UP_THRESHOLD {
        MonitorStatus::Up
    } else if rate >= DEGRADED_THRESHOLD {
        MonitorStatus::Degraded
    } else {
        MonitorStatus::Down
    }
}

/// Maximal runs of failed checks. A run ends at the next successful
/// check; a run still open at the end is ongoing and lasts until `now`.
#[must_use]
pub fn downtime_incidents(checks: &[&MonitorCheck], now: DateTime<Utc>) -> Vec<DowntimeIncident> {
    let mut incidents = Vec::new();
    let mut open: Option<&MonitorCheck> = None;
    for check in checks {
        match (check.success, open) {
            (false, None) => open = Some(*check),
            (true, Some(first)) => {
                incidents.push(DowntimeIncident {
                    started_at: first.checked_at,
                    ended_at: Some(check.checked_at),
                    duration: span(first.checked_at, check.checked_at),
                    reason: first.error.clone().unwrap_or_default(),
                    ongoing: false,
                });
                open = None;
            }
            (false, Some(_)) | (true, None) => {}
        }
    }
    if let Some(first) = open {
        incidents.push(DowntimeIncident {
            started_at: first.checked_at,
            ended_at: None,
            duration: span(first.checked_at, now),
            reason: first.error.clone().unwrap_or_default(),
            ongoing: true,
        });
    }
    incidents
}

fn span(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    to.signed_duration_since(from)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

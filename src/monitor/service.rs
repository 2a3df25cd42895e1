use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::clock::WallClock;
use crate::domain::{
    MonitorAlert, MonitorCheck, MonitorConfig, MonitorStats, UptimePeriod, UptimeReport,
};
use crate::error::MonitorError;
use crate::http::RequestExecutor;

use super::check::{CheckOutcome, perform_check};
use super::history::MonitorHistory;

struct MonitorEntry {
    config: MonitorConfig,
    history: MonitorHistory,
    task: Option<JoinHandle<()>>,
}

impl Drop for MonitorEntry {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

type MonitorTable = HashMap<String, MonitorEntry>;

/// In-memory uptime monitoring: one periodic checker task per started
/// monitor, history and alerts kept per monitor id.
///
/// Checker tasks only hold a weak reference to the monitor table; dropping
/// the last service handle aborts every checker.
#[derive(Clone)]
pub struct MonitorService {
    executor: Arc<dyn RequestExecutor>,
    clock: WallClock,
    monitors: Arc<Mutex<MonitorTable>>,
}

impl MonitorService {
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            executor,
            clock: WallClock::new(),
            monitors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts checking `config.request` immediately and then once per
    /// interval. A stopped monitor with the same id is restarted and keeps
    /// its history.
    ///
    /// # Errors
    ///
    /// Fails for a disabled monitor, a zero interval, or an id that is
    /// already running.
    pub fn start(&self, config: MonitorConfig) -> Result<(), MonitorError> {
        if !config.enabled {
            return Err(MonitorError::Disabled { id: config.id });
        }
        if config.interval.is_zero() {
            return Err(MonitorError::ZeroInterval { id: config.id });
        }

        let mut monitors = self.lock()?;
        if monitors
            .get(&config.id)
            .is_some_and(|entry| entry.task.is_some())
        {
            return Err(MonitorError::Duplicate { id: config.id });
        }

        let task = tokio::spawn(run_checks(
            Arc::downgrade(&self.monitors),
            Arc::clone(&self.executor),
            self.clock,
            config.clone(),
        ));
        info!(
            "Monitoring '{}' every {}s",
            config.name,
            config.interval.as_secs()
        );
        let entry = monitors
            .entry(config.id.clone())
            .or_insert_with(|| MonitorEntry {
                config: config.clone(),
                history: MonitorHistory::new(),
                task: None,
            });
        entry.config = config;
        entry.task = Some(task);
        Ok(())
    }

    /// Stops the periodic checker; history and alerts stay available.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn stop(&self, id: &str) -> Result<(), MonitorError> {
        let mut monitors = self.lock()?;
        let entry = monitors.get_mut(id).ok_or_else(|| unknown(id))?;
        if let Some(task) = entry.task.take() {
            task.abort();
            info!("Stopped monitor '{}'", entry.config.name);
        }
        Ok(())
    }

    /// Stops every running checker.
    pub fn stop_all(&self) {
        let Ok(mut monitors) = self.lock() else {
            return;
        };
        for entry in monitors.values_mut() {
            if let Some(task) = entry.task.take() {
                task.abort();
            }
        }
    }

    /// Stops a monitor and forgets everything recorded for it.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn remove(&self, id: &str) -> Result<MonitorConfig, MonitorError> {
        let mut monitors = self.lock()?;
        let entry = monitors.remove(id).ok_or_else(|| unknown(id))?;
        Ok(entry.config.clone())
    }

    /// Runs one check right away and records it like a scheduled one.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id.
    pub async fn run_now(&self, id: &str) -> Result<MonitorCheck, MonitorError> {
        let config = self.config(id)?;
        let outcome = self.check_once(&config).await;
        let check = outcome.check.clone();
        self.record(&config, outcome)?;
        Ok(check)
    }

    /// Performs a check without recording it anywhere.
    pub async fn check_once(&self, config: &MonitorConfig) -> CheckOutcome {
        perform_check(self.executor.as_ref(), config, &self.clock).await
    }

    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn stats(&self, id: &str) -> Result<MonitorStats, MonitorError> {
        let monitors = self.lock()?;
        let entry = monitors.get(id).ok_or_else(|| unknown(id))?;
        Ok(entry.history.stats(id))
    }

    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn uptime_report(
        &self,
        id: &str,
        period: UptimePeriod,
    ) -> Result<UptimeReport, MonitorError> {
        let monitors = self.lock()?;
        let entry = monitors.get(id).ok_or_else(|| unknown(id))?;
        Ok(entry.history.uptime_report(id, period, self.clock.now()))
    }

    /// Alerts raised for a monitor, newest first.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn alerts(&self, id: &str) -> Result<Vec<MonitorAlert>, MonitorError> {
        let monitors = self.lock()?;
        let entry = monitors.get(id).ok_or_else(|| unknown(id))?;
        Ok(entry.history.alerts())
    }

    /// # Errors
    ///
    /// Fails when the state lock is poisoned.
    pub fn monitor_ids(&self) -> Result<Vec<String>, MonitorError> {
        let monitors = self.lock()?;
        let mut ids: Vec<String> = monitors.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// # Errors
    ///
    /// Fails for an unknown id.
    pub fn is_running(&self, id: &str) -> Result<bool, MonitorError> {
        let monitors = self.lock()?;
        let entry = monitors.get(id).ok_or_else(|| unknown(id))?;
        Ok(entry
            .task
            .as_ref()
            .is_some_and(|task| !task.is_finished()))
    }

    fn config(&self, id: &str) -> Result<MonitorConfig, MonitorError> {
        let monitors = self.lock()?;
        monitors
            .get(id)
            .map(|entry| entry.config.clone())
            .ok_or_else(|| unknown(id))
    }

    fn record(&self, config: &MonitorConfig, outcome: CheckOutcome) -> Result<(), MonitorError> {
        record_outcome(&self.monitors, config, outcome)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MonitorTable>, MonitorError> {
        lock_table(&self.monitors)
    }
}

fn unknown(id: &str) -> MonitorError {
    MonitorError::Unknown { id: id.to_owned() }
}

fn lock_table(table: &Mutex<MonitorTable>) -> Result<MutexGuard<'_, MonitorTable>, MonitorError> {
    table.lock().map_err(|err| MonitorError::StatePoisoned {
        message: err.to_string(),
    })
}

fn record_outcome(
    table: &Mutex<MonitorTable>,
    config: &MonitorConfig,
    outcome: CheckOutcome,
) -> Result<(), MonitorError> {
    let mut monitors = lock_table(table)?;
    let entry = monitors.get_mut(&config.id).ok_or_else(|| unknown(&config.id))?;
    if !outcome.check.success {
        debug!(
            "Monitor '{}' check failed: {}",
            config.name,
            outcome.check.error.as_deref().unwrap_or("unknown error")
        );
    }
    for alert in entry.history.record(config, outcome) {
        warn!(
            "Monitor '{}' raised {} alert: {}",
            config.name,
            alert.kind.as_str(),
            alert.message
        );
    }
    Ok(())
}

/// Checks until the monitor table is gone or the entry was removed.
async fn run_checks(
    table: Weak<Mutex<MonitorTable>>,
    executor: Arc<dyn RequestExecutor>,
    clock: WallClock,
    config: MonitorConfig,
) {
    let mut ticker = interval_at(Instant::now(), config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let outcome = perform_check(executor.as_ref(), &config, &clock).await;
        let Some(monitors) = table.upgrade() else {
            debug!("Monitor '{}' service dropped; checker exiting", config.name);
            break;
        };
        if let Err(err) = record_outcome(&monitors, &config, outcome) {
            warn!("Monitor '{}' stopped: {}", config.name, err);
            break;
        }
    }
}

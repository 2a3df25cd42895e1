use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::domain::{
    DEFAULT_TIMELINE_INTERVAL, LoadTestConfig, MonitorConfig, RequestTemplate, RetryPolicy,
    TestCase, TestSuite, Variables,
};
use crate::error::{AppError, AppResult, ConfigError};

use super::parse_header;
use super::types::{CaseConfig, DurationValue, LoadConfig, MonitorFileConfig, PlanFile, SuiteConfig};

/// A plan file converted into runnable domain values.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub case_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub suites: Vec<TestSuite>,
    pub load: Option<LoadTestConfig>,
    pub monitors: Vec<MonitorConfig>,
}

impl Plan {
    /// # Errors
    ///
    /// Returns a config error for missing urls, duplicate case ids, bad
    /// durations or headers, and load tests pointing at unknown cases.
    pub fn from_file(file: &PlanFile) -> AppResult<Self> {
        let suites = file
            .suites
            .iter()
            .map(build_suite)
            .collect::<AppResult<Vec<_>>>()?;
        ensure_unique_case_ids(&suites)?;

        let load = file
            .load
            .as_ref()
            .map(|load| build_load(load, &suites))
            .transpose()?;
        let monitors = file
            .monitors
            .iter()
            .map(build_monitor)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            case_timeout: optional_duration(file.timeout.as_ref(), "timeout")?,
            connect_timeout: optional_duration(file.connect_timeout.as_ref(), "connect_timeout")?,
            suites,
            load,
            monitors,
        })
    }

    /// # Errors
    ///
    /// Returns an error for an unknown suite id.
    pub fn suite(&self, id: &str) -> AppResult<&TestSuite> {
        self.suites
            .iter()
            .find(|suite| suite.id == id)
            .ok_or_else(|| AppError::config(ConfigError::UnknownSuite { id: id.to_owned() }))
    }

    /// Finds a case, optionally only inside one suite, along with the
    /// variables of the suite that defines it.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown suite or case id.
    pub fn case(&self, id: &str, suite: Option<&str>) -> AppResult<(&TestCase, &Variables)> {
        let suites: Vec<&TestSuite> = match suite {
            Some(suite) => vec![self.suite(suite)?],
            None => self.suites.iter().collect(),
        };
        suites
            .into_iter()
            .find_map(|suite| {
                suite
                    .tests
                    .iter()
                    .find(|case| case.id == id)
                    .map(|case| (case, &suite.variables))
            })
            .ok_or_else(|| AppError::config(ConfigError::UnknownCase { id: id.to_owned() }))
    }

    /// # Errors
    ///
    /// Returns an error for an unknown monitor id.
    pub fn monitor(&self, id: &str) -> AppResult<&MonitorConfig> {
        self.monitors
            .iter()
            .find(|monitor| monitor.id == id)
            .ok_or_else(|| AppError::config(ConfigError::UnknownMonitor { id: id.to_owned() }))
    }
}

fn build_suite(config: &SuiteConfig) -> AppResult<TestSuite> {
    let tests = config
        .tests
        .iter()
        .enumerate()
        .map(|(index, case)| build_case(case, &config.id, index))
        .collect::<AppResult<Vec<_>>>()?;

    let mut suite = TestSuite::new(config.id.clone(), tests);
    if let Some(name) = &config.name {
        suite.name.clone_from(name);
    }
    suite.mode = config.mode.unwrap_or_default();
    suite.max_concurrency = config.max_concurrency.unwrap_or(0);
    suite.fail_fast = config.fail_fast.unwrap_or(false);
    suite.variables = config.variables.clone().unwrap_or_default();
    Ok(suite)
}

/// Cases without an id get `<suite>-<position>`, counting from 1.
fn build_case(config: &CaseConfig, suite: &str, index: usize) -> AppResult<TestCase> {
    let url = config
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            AppError::config(ConfigError::CaseMissingUrl {
                suite: suite.to_owned(),
                index,
            })
        })?;
    let id = config
        .id
        .clone()
        .unwrap_or_else(|| format!("{}-{}", suite, index.saturating_add(1)));
    let field = format!("{}.{}", suite, id);

    let request = RequestTemplate {
        method: config.method.unwrap_or_default(),
        url: url.to_owned(),
        headers: headers(config.headers.as_deref(), &field)?,
        body: config.body.clone().unwrap_or_default(),
    };

    let mut case = TestCase::new(id, request);
    if let Some(name) = &config.name {
        case.name.clone_from(name);
    }
    case.assertions.clone_from(&config.assertions);
    case.enabled = config.enabled.unwrap_or(true);
    case.pre_script.clone_from(&config.pre_script);
    case.post_script.clone_from(&config.post_script);
    case.timeout = optional_duration(config.timeout.as_ref(), &field)?.unwrap_or(Duration::ZERO);
    if let Some(retry) = &config.retry {
        let interval = optional_duration(retry.interval.as_ref(), &field)?.unwrap_or_default();
        case.retry = RetryPolicy::new(retry.count, interval);
    }
    Ok(case)
}

fn ensure_unique_case_ids(suites: &[TestSuite]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for case in suites.iter().flat_map(|suite| suite.tests.iter()) {
        if !seen.insert(case.id.as_str()) {
            return Err(AppError::config(ConfigError::DuplicateCaseId {
                id: case.id.clone(),
            }));
        }
    }
    Ok(())
}

fn build_load(config: &LoadConfig, suites: &[TestSuite]) -> AppResult<LoadTestConfig> {
    let test_case = match (&config.case, &config.test) {
        (Some(_), Some(_)) => return Err(AppError::config(ConfigError::LoadConflictingCase)),
        (None, None) => return Err(AppError::config(ConfigError::LoadMissingCase)),
        (Some(id), None) => suites
            .iter()
            .flat_map(|suite| suite.tests.iter())
            .find(|case| &case.id == id)
            .cloned()
            .ok_or_else(|| AppError::config(ConfigError::UnknownCase { id: id.clone() }))?,
        (None, Some(inline)) => build_case(inline, "load", 0)?,
    };

    let duration = required_duration(&config.duration, "load.duration")?;
    if duration.is_zero() {
        return Err(positive("load.duration"));
    }
    let mut load = LoadTestConfig::new(test_case, duration, config.max_users);
    load.ramp_up = optional_duration(config.ramp_up.as_ref(), "load.ramp_up")?.unwrap_or_default();
    load.requests_per_sec = config.requests_per_sec.unwrap_or(0);
    load.timeline_interval =
        optional_duration(config.timeline_interval.as_ref(), "load.timeline_interval")?
            .unwrap_or(DEFAULT_TIMELINE_INTERVAL);
    if load.timeline_interval.is_zero() {
        return Err(positive("load.timeline_interval"));
    }
    Ok(load)
}

fn build_monitor(config: &MonitorFileConfig) -> AppResult<MonitorConfig> {
    let field = format!("monitors.{}", config.id);
    let request = RequestTemplate {
        method: config.method.unwrap_or_default(),
        url: config.url.trim().to_owned(),
        headers: headers(config.headers.as_deref(), &field)?,
        body: config.body.clone().unwrap_or_default(),
    };
    let mut monitor = MonitorConfig::new(config.id.clone(), request);
    if let Some(name) = &config.name {
        monitor.name.clone_from(name);
    }
    if let Some(interval) = optional_duration(config.interval.as_ref(), &field)? {
        monitor.interval = interval;
    }
    if let Some(timeout) = optional_duration(config.timeout.as_ref(), &field)? {
        monitor.timeout = timeout;
    }
    monitor.slow_threshold = match optional_duration(config.slow_threshold.as_ref(), &field)? {
        Some(threshold) => threshold,
        None => monitor.timeout.checked_div(2).unwrap_or_default(),
    };
    monitor.enabled = config.enabled.unwrap_or(true);
    if monitor.interval.is_zero() {
        return Err(positive(&format!("{}.interval", field)));
    }
    if monitor.timeout.is_zero() {
        return Err(positive(&format!("{}.timeout", field)));
    }
    Ok(monitor)
}

fn headers(lines: Option<&[String]>, field: &str) -> AppResult<BTreeMap<String, String>> {
    let mut parsed = BTreeMap::new();
    for line in lines.unwrap_or_default() {
        let (key, value) = parse_header(line).map_err(|err| {
            AppError::config(ConfigError::InvalidHeader {
                field: field.to_owned(),
                source: err,
            })
        })?;
        parsed.insert(key, value);
    }
    Ok(parsed)
}

fn required_duration(value: &DurationValue, field: &str) -> AppResult<Duration> {
    value.to_duration().map_err(|err| {
        AppError::config(ConfigError::InvalidField {
            field: field.to_owned(),
            source: Box::new(err),
        })
    })
}

fn optional_duration(value: Option<&DurationValue>, field: &str) -> AppResult<Option<Duration>> {
    value.map(|value| required_duration(value, field)).transpose()
}

fn positive(field: &str) -> AppError {
    AppError::config(ConfigError::FieldMustBePositive {
        field: field.to_owned(),
    })
}

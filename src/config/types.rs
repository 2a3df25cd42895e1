use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{Assertion, ExecutionMode, HttpMethod};
use crate::error::ConfigError;

/// Top level of a `restbench.toml` / `restbench.json` plan.
#[derive(Debug, Default, Deserialize)]
pub struct PlanFile {
    /// Default per-case timeout when a case sets none.
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    #[serde(default)]
    pub suites: Vec<SuiteConfig>,
    pub load: Option<LoadConfig>,
    #[serde(default)]
    pub monitors: Vec<MonitorFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuiteConfig {
    pub id: String,
    pub name: Option<String>,
    pub mode: Option<ExecutionMode>,
    #[serde(alias = "concurrency")]
    pub max_concurrency: Option<usize>,
    pub fail_fast: Option<bool>,
    #[serde(alias = "vars")]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "cases")]
    pub tests: Vec<CaseConfig>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct CaseConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    /// `Key: Value` lines.
    pub headers: Option<Vec<String>>,
    #[serde(alias = "data")]
    pub body: Option<String>,
    pub timeout: Option<DurationValue>,
    pub retry: Option<RetryConfig>,
    pub enabled: Option<bool>,
    pub pre_script: Option<String>,
    pub post_script: Option<String>,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default)]
    pub count: u32,
    pub interval: Option<DurationValue>,
}

#[derive(Debug, Deserialize)]
pub struct LoadConfig {
    /// Id of a case defined in any suite.
    pub case: Option<String>,
    /// Inline case, used instead of `case`.
    pub test: Option<CaseConfig>,
    pub duration: DurationValue,
    pub ramp_up: Option<DurationValue>,
    #[serde(alias = "users")]
    pub max_users: usize,
    #[serde(alias = "rps")]
    pub requests_per_sec: Option<u32>,
    pub timeline_interval: Option<DurationValue>,
}

#[derive(Debug, Deserialize)]
pub struct MonitorFileConfig {
    pub id: String,
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: String,
    pub headers: Option<Vec<String>>,
    #[serde(alias = "data")]
    pub body: Option<String>,
    pub interval: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub slow_threshold: Option<DurationValue>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// # Errors
    ///
    /// Returns an error when the text form cannot be parsed.
    pub fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}

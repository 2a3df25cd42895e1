use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("No config file found (pass --config or create restbench.toml).")]
    NotFound,
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Invalid duration for '{field}': {source}")]
    InvalidField {
        field: String,
        #[source]
        source: Box<ConfigError>,
    },
    #[error("Invalid header in '{field}': {source}")]
    InvalidHeader {
        field: String,
        #[source]
        source: super::ValidationError,
    },
    #[error("Config '{field}' must be > 0.")]
    FieldMustBePositive { field: String },
    #[error("Test case {index} in suite '{suite}' must define a url.")]
    CaseMissingUrl { suite: String, index: usize },
    #[error("Duplicate test case id '{id}'.")]
    DuplicateCaseId { id: String },
    #[error("Config has no [load] section.")]
    MissingLoadSection,
    #[error("Load test must reference a case id or define an inline test.")]
    LoadMissingCase,
    #[error("Load test cannot set both 'case' and an inline test.")]
    LoadConflictingCase,
    #[error("Unknown test case '{id}'.")]
    UnknownCase { id: String },
    #[error("Unknown suite '{id}'.")]
    UnknownSuite { id: String },
    #[error("Unknown monitor '{id}'.")]
    UnknownMonitor { id: String },
    #[error("Config defines no {section}.")]
    EmptySection { section: &'static str },
}

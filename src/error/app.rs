use thiserror::Error;

use super::{ConfigError, HttpError, MonitorError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Format error: {source}")]
    Format {
        #[from]
        source: std::fmt::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),
    #[error("Test case '{case}' finished with status '{status}'.")]
    CaseFailed { case: String, status: &'static str },
    #[error("{failed} of {total} test case(s) failed in '{suite}'.")]
    SuiteFailed {
        suite: String,
        failed: usize,
        total: usize,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[must_use]
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    #[must_use]
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    #[must_use]
    pub fn http<E>(error: E) -> Self
    where
        E: Into<HttpError>,
    {
        error.into().into()
    }

    #[must_use]
    pub fn monitor<E>(error: E) -> Self
    where
        E: Into<MonitorError>,
    {
        error.into().into()
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Monitor '{id}' is already registered.")]
    Duplicate { id: String },
    #[error("Unknown monitor '{id}'.")]
    Unknown { id: String },
    #[error("Monitor '{id}' is disabled.")]
    Disabled { id: String },
    #[error("Monitor '{id}' interval must be > 0.")]
    ZeroInterval { id: String },
    #[error("Monitor state lock poisoned: {message}")]
    StatePoisoned { message: String },
}

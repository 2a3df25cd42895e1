use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Suite '{suite}' runs in parallel mode and needs max_concurrency >= 1.")]
    ZeroConcurrency { suite: String },
    #[error("Load test timeline interval must be > 0.")]
    ZeroTimelineInterval,
    #[error("Load test ramp-up of {ramp_up_ms}ms is too long.")]
    RampUpTooLong { ramp_up_ms: u128 },
    #[error("Invalid duration '{value}': {message}")]
    InvalidDuration { value: String, message: String },
    #[error("Invalid number: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid uptime period '{value}'. Use 24h, 7d or 30d.")]
    InvalidPeriod { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
}

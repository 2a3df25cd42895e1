use std::time::Duration;

use super::types::{PositiveU32, PositiveUsize};
use crate::config::parse_duration_value;
use crate::domain::UptimePeriod;
use crate::error::ValidationError;

pub(crate) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

pub(crate) fn parse_positive_u32(s: &str) -> Result<PositiveU32, ValidationError> {
    s.parse::<PositiveU32>()
}

/// Durations as in plan files: `ms`, `s`, `m`, `h`, or bare seconds.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_duration_value(s).map_err(|err| ValidationError::InvalidDuration {
        value: s.to_owned(),
        message: err.to_string(),
    })
}

/// Like [`parse_duration_arg`] but rejects zero.
pub(crate) fn parse_positive_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let duration = parse_duration_arg(s)?;
    if duration.is_zero() {
        return Err(ValidationError::InvalidDuration {
            value: s.to_owned(),
            message: "must be > 0".to_owned(),
        });
    }
    Ok(duration)
}

pub(crate) fn parse_period(s: &str) -> Result<UptimePeriod, ValidationError> {
    match s.trim() {
        "24h" => Ok(UptimePeriod::Day),
        "7d" => Ok(UptimePeriod::Week),
        "30d" => Ok(UptimePeriod::Month),
        other => Err(ValidationError::InvalidPeriod {
            value: other.to_owned(),
        }),
    }
}

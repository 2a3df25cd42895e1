use std::time::Duration;

use crate::error::{ConfigError, ValidationError};

/// Parses `500ms`, `10s`, `2m`, `1h`, or a bare number of seconds.
/// Zero is allowed; callers that need a positive value check it.
///
/// # Errors
///
/// Returns an error for empty input, a missing number, an unknown unit or
/// an overflowing value.
pub fn parse_duration_value(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ConfigError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ConfigError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part.trim() };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(
            number
                .checked_mul(60)
                .ok_or(ConfigError::DurationOverflow)?,
        ),
        "h" => Duration::from_secs(
            number
                .checked_mul(60)
                .and_then(|minutes| minutes.checked_mul(60))
                .ok_or(ConfigError::DurationOverflow)?,
        ),
        _ => {
            return Err(ConfigError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    Ok(duration)
}

/// Splits a `Key: Value` header line.
///
/// # Errors
///
/// Returns an error when the colon or the key is missing.
pub fn parse_header(value: &str) -> Result<(String, String), ValidationError> {
    let Some((key, header_value)) = value.split_once(':') else {
        return Err(ValidationError::InvalidHeaderFormat {
            value: value.to_owned(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ValidationError::InvalidHeaderFormat {
            value: value.to_owned(),
        });
    }
    Ok((key.to_owned(), header_value.trim().to_owned()))
}

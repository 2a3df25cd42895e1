//! Serde adapter that writes a `Duration` as whole milliseconds.
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a duration as its millisecond count.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Deserialize a millisecond count into a duration.
///
/// # Errors
///
/// Fails when the input is not an unsigned integer.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

use tokio::io::AsyncWriteExt;

use super::Report;
use crate::error::AppResult;

/// # Errors
///
/// Returns an error if the report fails to serialize.
pub fn to_json(report: &Report) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the report as pretty JSON to `path`.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub async fn export_json(path: &str, report: &Report) -> AppResult<()> {
    let body = to_json(report)?;
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(body.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

use std::time::Duration;

use tokio::time::{Instant, timeout};

use crate::clock::WallClock;
use crate::domain::{MonitorCheck, MonitorConfig};
use crate::error::TransportError;
use crate::http::RequestExecutor;

/// A recorded check plus whether the endpoint was unreachable, which is
/// what separates downtime from an unhealthy status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub check: MonitorCheck,
    pub unreachable: bool,
}

/// Statuses from 200 up to, not including, 400 count as up.
#[must_use]
pub fn is_healthy_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Sends the monitor's request once, bounded by its timeout.
pub async fn perform_check(
    executor: &dyn RequestExecutor,
    config: &MonitorConfig,
    clock: &WallClock,
) -> CheckOutcome {
    let start = Instant::now();
    let result = match timeout(config.timeout, executor.execute(&config.request, config.timeout))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(TransportError::timeout(format!(
            "no response within {}ms",
            config.timeout.as_millis()
        ))),
    };
    let response_time: Duration = start.elapsed();
    let checked_at = clock.at(start);

    match result {
        Ok(response) => {
            let success = is_healthy_status(response.status_code);
            CheckOutcome {
                check: MonitorCheck {
                    checked_at,
                    status_code: Some(response.status_code),
                    response_time,
                    success,
                    error: (!success).then(|| format!("HTTP {}", response.status_code)),
                },
                unreachable: false,
            }
        }
        Err(err) => CheckOutcome {
            check: MonitorCheck {
                checked_at,
                status_code: None,
                response_time,
                success: false,
                error: Some(err.to_string()),
            },
            unreachable: true,
        },
    }
}

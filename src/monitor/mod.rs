//! Endpoint uptime monitoring: periodic checks, alerts, stats and
//! uptime reports, all kept in memory.
mod check;
mod history;
mod service;


pub use check::{CheckOutcome, is_healthy_status, perform_check};
pub use history::{
    ERROR_RATE_THRESHOLD, ERROR_RATE_WINDOW, MonitorHistory, RECENT_CHECKS, downtime_incidents,
    status_of,
};
pub use service::MonitorService;

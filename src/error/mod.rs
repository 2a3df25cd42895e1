mod app;
mod config;
mod http;
mod monitor;
mod transport;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use monitor::MonitorError;
pub use transport::{TransportError, TransportErrorKind};
pub use validation::ValidationError;

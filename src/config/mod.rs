//! Plan-file loading and conversion into domain values.
mod apply;
mod loader;
mod parse;
pub mod types;


pub use apply::Plan;
pub use loader::{load_plan, load_plan_file};
pub use parse::{parse_duration_value, parse_header};

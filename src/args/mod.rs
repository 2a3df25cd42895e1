//! CLI argument types and parsing helpers.
mod cli;
mod parsers;
mod types;


pub use cli::{BenchArgs, CaseArgs, Command, LoadArgs, MonitorArgs, SuiteArgs};
pub use types::{OutputFormat, PositiveU32, PositiveUsize};

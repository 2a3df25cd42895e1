use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::domain::UptimePeriod;

use super::parsers::{
    parse_duration_arg, parse_period, parse_positive_duration_arg, parse_positive_u32,
    parse_positive_usize,
};
use super::types::{OutputFormat, PositiveU32, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run one suite, or every suite in the plan
    Suite(SuiteArgs),
    /// Run a single test case with its suite's variables
    Case(CaseArgs),
    /// Run the plan's load test, optionally overriding its settings
    Load(LoadArgs),
    /// Check monitored endpoints and print stats and uptime
    Monitor(MonitorArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SuiteArgs {
    /// Suite id (defaults to all suites)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CaseArgs {
    /// Test case id
    pub id: String,

    /// Only look for the case inside this suite
    #[arg(long)]
    pub suite: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Use this test case instead of the one configured under [load]
    #[arg(long)]
    pub case: Option<String>,

    /// Total test duration (supports ms/s/m/h)
    #[arg(long, short = 't', value_parser = parse_positive_duration_arg)]
    pub duration: Option<Duration>,

    /// Time to reach the full user count (supports ms/s/m/h)
    #[arg(long = "ramp-up", value_parser = parse_duration_arg)]
    pub ramp_up: Option<Duration>,

    /// Maximum concurrent virtual users
    #[arg(long, short = 'u', value_parser = parse_positive_usize)]
    pub users: Option<PositiveUsize>,

    /// Iterations per second for each virtual user
    #[arg(long, value_parser = parse_positive_u32)]
    pub rps: Option<PositiveU32>,
}

#[derive(Debug, Args, Clone)]
pub struct MonitorArgs {
    /// Monitor id (defaults to all monitors)
    #[arg(long)]
    pub name: Option<String>,

    /// Stop after this many checks per monitor (runs until Ctrl-C otherwise)
    #[arg(long, value_parser = parse_positive_usize)]
    pub checks: Option<PositiveUsize>,

    /// Uptime report period (24h, 7d, 30d)
    #[arg(long, default_value = "24h", value_parser = parse_period)]
    pub period: UptimePeriod,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "restbench",
    version,
    about = "API test workbench: assertion-based test cases, suites, load tests and uptime monitors."
)]
pub struct BenchArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the plan file (TOML/JSON). Defaults to ./restbench.toml or ./restbench.json.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by RESTBENCH_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Result output format
    #[arg(long, short = 'o', default_value = "text", value_enum, global = true)]
    pub output: OutputFormat,

    /// Also write the full result as JSON to this path
    #[arg(long = "export-json", global = true)]
    pub export_json: Option<String>,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_positive_duration_arg, global = true)]
    pub connect_timeout: Option<Duration>,

    /// Default per-request timeout for cases that set none (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_positive_duration_arg, global = true)]
    pub request_timeout: Option<Duration>,
}

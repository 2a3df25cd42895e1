//! Latency aggregation shared by the suite summary and the load engine.
mod latency;


pub use latency::{LatencySummary, mean, percentile, percentile_index, rate_percent, summarize};

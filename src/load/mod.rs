//! Load Test Engine: virtual users on a linear ramp, per-user pacing,
//! a periodic timeline and sort-and-index percentiles at the end.
mod engine;
mod live;
mod ramp;
mod timeline;
mod worker;

#[cfg(test)]
mod tests;

pub use engine::LoadTestEngine;
pub use live::{ActiveUserGuard, LiveCounters, LiveSnapshot};
pub use ramp::{RAMP_TICK, RampSchedule, RampStep};
pub use worker::RequestSample;

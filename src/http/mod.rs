//! Request execution: the executor seam and its reqwest implementation.
mod client;
mod executor;


pub use client::{ClientSettings, DEFAULT_USER_AGENT, ReqwestExecutor};
pub use executor::{RequestExecutor, RequestResolver, VerbatimResolver};

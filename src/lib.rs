//! Core library for the `restbench` CLI.
//!
//! This crate provides the building blocks of an API test workbench:
//! assertion evaluation, single test case execution with timeout and
//! retry, test suites run sequentially or with bounded parallelism, a
//! ramping virtual-user load test engine, and uptime monitors. HTTP is
//! reached only through the [`http::RequestExecutor`] trait so every
//! runner can be driven by a scripted executor in tests.
pub mod args;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod load;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod testing;
pub mod workbench;

#[cfg(test)]
mod test_support;

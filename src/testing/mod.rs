//! Assertion evaluation, single test case execution and suite orchestration.
mod assertion;
mod case;
mod suite;

#[cfg(test)]
mod tests;

pub use assertion::{evaluate, evaluate_all};
pub use case::{DEFAULT_CASE_TIMEOUT, TestCaseRunner};
pub use suite::{TestSuiteRunner, summarize_results};

//! copyperf testing suite
//!
//! Shared fixtures for the cross-crate integration tests and the criterion
//! benchmarks that compare the copy strategies.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Data generators and file fixtures used by both the integration tests
/// and the benchmarks, so that they measure the same inputs.
pub mod test_utils;

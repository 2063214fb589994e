//! Common test utilities and helpers for workflow tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Test fixtures (managers, project directories, inputs)
//! - Event assertions and collectors

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

//! # cobalt-test
//!
//! Integration tests for Cobalt.
//!
//! This crate contains:
//! - End-to-end tests over the TCP transport
//! - Scenario tests against the engine and the shared database handle

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;

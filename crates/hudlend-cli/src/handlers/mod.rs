//! Command handlers.
//!
//! Each handler writes its report to the given writer so tests can capture
//! the output.

pub mod paths;
pub mod stress;

//! Command-line adapter for hudlend.
//!
//! The binary in `main.rs` is the composition root; everything it
//! dispatches to lives here so it can be tested without spawning a process.
#![deny(unused_crate_dependencies)]

// Used by main.rs
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

#[cfg(test)]
use tempfile as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;

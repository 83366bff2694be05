//! Top-level arguments shared by every subcommand.

use std::path::PathBuf;

use clap::Parser;
use hudlend_core::paths::DATA_DIR_ENV;

use crate::commands::Commands;

/// Command-line interface for the overlay runtime's device lending and
/// path bootstrapping.
#[derive(Parser)]
#[command(name = "hudlend")]
#[command(about = "Inspect overlay paths and exercise graphics device lending")]
#[command(version)]
pub struct Cli {
    /// Override the base data directory for this invocation
    #[arg(long = "data-dir", global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

//! Available subcommands.

use clap::Subcommand;

/// Available commands for the hudlend tool.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Resolve the base directory (migrating legacy settings) and show it
    Paths {
        /// Register and create a named subdirectory (repeatable)
        #[arg(short = 'd', long = "dir")]
        directories: Vec<String>,
    },

    /// Run a concurrent workload against a simulated device and report
    /// how leases were granted
    Stress {
        /// Number of background worker threads
        #[arg(short, long, default_value_t = 4)]
        workers: usize,
        /// Leases each worker takes
        #[arg(short, long, default_value_t = 1000)]
        cycles: usize,
        /// Frames rendered on the primary thread meanwhile
        #[arg(short, long, default_value_t = 100)]
        frames: usize,
        /// Fraction of worker requests made at high priority (0.0 - 1.0)
        #[arg(long = "high-ratio", default_value_t = 0.2)]
        high_ratio: f64,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
}

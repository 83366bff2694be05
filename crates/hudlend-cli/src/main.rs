//! CLI entry point - the composition root.
//!
//! Wires up logging and configuration, then dispatches to handlers.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use hudlend_cli::handlers::stress::StressConfig;
use hudlend_cli::{Cli, CliError, Commands, handlers};

fn main() -> ExitCode {
    // Load environment variables before clap reads HUDLEND_DATA_DIR
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            eprintln!("Error: {err:#}");
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so command output
/// on stdout stays machine-readable.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Paths { directories } => {
            handlers::paths::execute(&mut stdout, cli.data_dir.as_deref(), &directories)?;
        }
        Commands::Stress {
            workers,
            cycles,
            frames,
            high_ratio,
            json,
        } => {
            let config = StressConfig {
                workers,
                cycles,
                frames,
                high_ratio,
            };
            handlers::stress::execute(&mut stdout, config, json)?;
        }
    }

    Ok(())
}

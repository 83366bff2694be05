//! Command failures and the process exit codes they map to.

use hudlend_core::{LendError, PathError};
use thiserror::Error;

/// Why a command failed.
#[derive(Debug, Error)]
pub enum CliError {
    /// Base directory resolution or directory registration failed.
    #[error("Path error: {0}")]
    Paths(#[from] PathError),

    /// The lending service rejected a release.
    #[error("Device lending error: {0}")]
    Lending(#[from] LendError),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// A workload thread panicked.
    #[error("Worker failed: {0}")]
    Worker(String),

    /// Writing the report failed.
    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Process exit code: 2 for bad arguments, `sysexits.h` values otherwise.
    /// Errors that are not a `CliError` exit with 1.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Paths(_) => 73,   // EX_CANTCREAT
            Self::Lending(_) => 70, // EX_SOFTWARE
            Self::Arguments(_) => 2,
            Self::Worker(_) => 71, // EX_OSERR
            Self::Output(_) => 74, // EX_IOERR
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Paths(PathError::Blank).exit_code(), 73);
        let misuse = LendError::NotHolder {
            ticket: 1,
            issuer: 2,
            service: 3,
        };
        assert_eq!(CliError::from(misuse).exit_code(), 70);
    }
}

//! Paths command handler.
//!
//! Resolves the base directory (running the legacy settings migration on
//! the way) and displays it, optionally registering named subdirectories.

use std::io::Write;
use std::path::Path;

use hudlend_core::paths::{BaseDirectory, BaseDirectoryResolver, PathError, base_dir};

use crate::error::CliError;

/// Execute the paths command.
///
/// Output is `key = value` lines, one per resolved path.
pub fn execute(
    out: &mut impl Write,
    data_dir: Option<&Path>,
    directories: &[String],
) -> Result<(), CliError> {
    let base = resolve_base(data_dir)?;
    writeln!(out, "{base}").map_err(|e| CliError::Output(e.to_string()))?;

    if directories.is_empty() {
        return Ok(());
    }

    let registry = base.register_directories(directories)?;
    for (name, path) in registry.iter() {
        writeln!(out, "dir.{name} = {}", path.display())
            .map_err(|e| CliError::Output(e.to_string()))?;
    }
    Ok(())
}

fn resolve_base(data_dir: Option<&Path>) -> Result<BaseDirectory, CliError> {
    let Some(dir) = data_dir else {
        return Ok(base_dir()?);
    };

    let cwd = std::env::current_dir().map_err(PathError::WorkingDir)?;
    Ok(BaseDirectoryResolver::with_base(dir, cwd).resolve()?)
}

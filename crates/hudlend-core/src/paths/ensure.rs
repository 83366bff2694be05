//! Creating directories and checking that they accept writes.

use std::fs;
use std::path::Path;

use super::error::PathError;

const WRITE_PROBE_CONTENTS: &str = "test-write";

/// What [`ensure_directory`] does about a missing directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create it, parents included.
    #[default]
    AutoCreate,
    /// Report [`PathError::Missing`].
    Disallow,
}

/// Make sure `path` is a directory.
///
/// An existing directory is left alone, so repeated calls are harmless. A
/// file at `path` is always an error.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::OccupiedByFile(path.to_path_buf()));
        }
        return Ok(());
    }

    match strategy {
        DirectoryCreationStrategy::AutoCreate => {
            fs::create_dir_all(path).map_err(|source| PathError::Create {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "Created directory");
            Ok(())
        }
        DirectoryCreationStrategy::Disallow => Err(PathError::Missing(path.to_path_buf())),
    }
}

/// Verify a directory is writable by round-tripping a uniquely named probe file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let probe = path.join(format!("{}.tmp", uuid::Uuid::new_v4()));
    let not_writable = |detail: String| PathError::NotWritable {
        path: path.to_path_buf(),
        detail,
    };

    fs::write(&probe, WRITE_PROBE_CONTENTS).map_err(|e| not_writable(e.to_string()))?;
    let read_back = fs::read_to_string(&probe);
    let _ = fs::remove_file(&probe);

    match read_back {
        Ok(contents) if contents == WRITE_PROBE_CONTENTS => Ok(()),
        Ok(_) => Err(not_writable("probe file contents did not round-trip".to_string())),
        Err(e) => Err(not_writable(e.to_string())),
    }
}

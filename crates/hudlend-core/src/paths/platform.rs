//! Platform-specific path detection.
//!
//! Private helpers for locating the user's documents folder, the working
//! directory and environment overrides. Public API is exposed through
//! sibling modules.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable that overrides the base directory.
pub const DATA_DIR_ENV: &str = "HUDLEND_DATA_DIR";

/// Location of the base directory relative to the user's documents folder.
pub const DEFAULT_BASE_DIR_RELATIVE: [&str; 3] = ["Guild Wars 2", "addons", "blishhud"];

/// Default base directory: `<documents>/Guild Wars 2/addons/blishhud`.
pub fn documents_base_dir() -> Result<PathBuf, PathError> {
    let documents = dirs::document_dir().ok_or(PathError::DocumentsUnknown)?;
    Ok(DEFAULT_BASE_DIR_RELATIVE
        .iter()
        .fold(documents, |path, part| path.join(part)))
}

/// Base directory override from `HUDLEND_DATA_DIR`, if set and non-blank.
pub(super) fn env_override() -> Result<Option<PathBuf>, PathError> {
    match env::var(DATA_DIR_ENV) {
        Ok(raw) if !raw.trim().is_empty() => normalize_user_path(&raw).map(Some),
        _ => Ok(None),
    }
}

/// The process working directory.
pub(super) fn working_dir() -> Result<PathBuf, PathError> {
    env::current_dir().map_err(PathError::WorkingDir)
}

/// Normalize a user-provided path, expanding `~` and making it absolute.
pub(super) fn normalize_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::Blank);
    }

    let expanded = if trimmed.starts_with("~/") || trimmed == "~" {
        let home = dirs::home_dir().ok_or(PathError::HomeUnknown)?;
        if trimmed == "~" {
            home
        } else {
            home.join(trimmed.trim_start_matches("~/"))
        }
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        working_dir().map(|cwd| cwd.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::ScopedEnvVar;

    #[test]
    fn relative_paths_are_made_absolute() {
        let path = normalize_user_path("overlay-data").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("overlay-data"));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(normalize_user_path("   "), Err(PathError::Blank)));
    }

    #[test]
    fn documents_dir_ends_with_addon_location() {
        // Headless CI machines may have no documents folder at all.
        if let Ok(dir) = documents_base_dir() {
            assert!(dir.ends_with("Guild Wars 2/addons/blishhud"));
        }
    }

    #[test]
    fn env_override_is_read_and_normalized() {
        let _env = ScopedEnvVar::set(DATA_DIR_ENV, "/tmp/hudlend-override");
        let resolved = env_override().unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/tmp/hudlend-override")));
    }

    #[test]
    fn unset_env_override_is_none() {
        let _env = ScopedEnvVar::unset(DATA_DIR_ENV);
        assert_eq!(env_override().unwrap(), None);
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let _env = ScopedEnvVar::set(DATA_DIR_ENV, "  ");
        assert_eq!(env_override().unwrap(), None);
    }
}

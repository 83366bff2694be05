//! Base directory resolution.
//!
//! Everything the overlay writes (settings, caches, logs, module data) lives
//! under a single base directory. It is resolved once at startup, created if
//! missing, and a settings file left behind by older releases is migrated
//! into it.

use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use super::ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
use super::error::PathError;
use super::migration::{MigrationOutcome, SETTINGS_FILE_NAME, migrate_legacy_file};
use super::platform::{documents_base_dir, env_override, working_dir};
use super::registry::DirectoryRegistry;

/// How the base directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDirSource {
    /// Passed in by the caller (e.g. a CLI flag).
    Explicit,
    /// The `HUDLEND_DATA_DIR` environment variable.
    EnvOverride,
    /// The fixed location under the user's documents folder.
    Documents,
    /// The working directory, used when the preferred location is unusable.
    WorkingDirectory,
}

/// Result of base directory resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseDirectory {
    /// Absolute, existing, writable directory.
    pub path: PathBuf,
    /// How `path` was chosen.
    pub source: BaseDirSource,
    /// What happened to the legacy settings file.
    pub migration: MigrationOutcome,
}

impl BaseDirectory {
    /// Register named subdirectories of this base directory.
    pub fn register_directories<I, S>(&self, names: I) -> Result<DirectoryRegistry, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        DirectoryRegistry::register(&self.path, names)
    }

    /// Where the settings file is expected.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.path.join(SETTINGS_FILE_NAME)
    }
}

impl fmt::Display for BaseDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "base_dir = {}", self.path.display())?;
        writeln!(f, "base_dir_source = {:?}", self.source)?;
        writeln!(f, "settings_path = {}", self.settings_path().display())?;
        write!(f, "migration = {:?}", self.migration)
    }
}

/// Resolves the base directory and performs the legacy settings migration.
///
/// Resolution order:
/// 1. `preferred` (from `HUDLEND_DATA_DIR` or the documents folder)
/// 2. `fallback` (the working directory) if `preferred` is unknown, cannot
///    be created, or is not writable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectoryResolver {
    /// Preferred location and its source.
    pub preferred: Option<(PathBuf, BaseDirSource)>,
    /// Used when the preferred location is unusable.
    pub fallback: PathBuf,
    /// Directory that may hold a legacy settings file.
    pub legacy_dir: PathBuf,
}

impl BaseDirectoryResolver {
    /// Production configuration: env override, then documents folder, with
    /// the working directory as fallback and legacy location.
    pub fn from_env() -> Result<Self, PathError> {
        let cwd = working_dir()?;
        let preferred = match env_override()? {
            Some(path) => Some((path, BaseDirSource::EnvOverride)),
            None => match documents_base_dir() {
                Ok(path) => Some((path, BaseDirSource::Documents)),
                Err(err) => {
                    tracing::warn!(error = %err, "No documents folder; using working directory");
                    None
                }
            },
        };

        Ok(Self {
            preferred,
            fallback: cwd.clone(),
            legacy_dir: cwd,
        })
    }

    /// Resolver for an explicit base directory, with no fallback.
    #[must_use]
    pub fn with_base(path: impl Into<PathBuf>, legacy_dir: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            preferred: Some((path.clone(), BaseDirSource::Explicit)),
            fallback: path,
            legacy_dir: legacy_dir.into(),
        }
    }

    /// Pick, create and verify the base directory, then migrate settings.
    ///
    /// Failing to create the fallback directory is an error. The migration
    /// never is.
    pub fn resolve(&self) -> Result<BaseDirectory, PathError> {
        let (path, source) = self.pick()?;
        let migration = migrate_legacy_file(
            &self.legacy_dir.join(SETTINGS_FILE_NAME),
            &path.join(SETTINGS_FILE_NAME),
        );

        tracing::info!(
            base_dir = %path.display(),
            source = ?source,
            migration = ?migration,
            "Resolved base directory"
        );

        Ok(BaseDirectory {
            path,
            source,
            migration,
        })
    }

    fn pick(&self) -> Result<(PathBuf, BaseDirSource), PathError> {
        if let Some((path, source)) = &self.preferred {
            match prepare(path) {
                Ok(()) => return Ok((path.clone(), *source)),
                Err(err) if path != &self.fallback => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Preferred base directory unusable; falling back"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        prepare(&self.fallback)?;
        Ok((self.fallback.clone(), BaseDirSource::WorkingDirectory))
    }
}

fn prepare(path: &Path) -> Result<(), PathError> {
    ensure_directory(path, DirectoryCreationStrategy::AutoCreate)?;
    verify_writable(path)
}

static BASE_DIR: Mutex<Option<BaseDirectory>> = parking_lot::const_mutex(None);

/// The process-wide base directory.
///
/// Resolved from the environment on first call; later calls return the
/// cached result, so the legacy migration runs at most once per process.
pub fn base_dir() -> Result<BaseDirectory, PathError> {
    let mut cached = BASE_DIR.lock();
    if let Some(base) = cached.as_ref() {
        return Ok(base.clone());
    }

    let resolved = BaseDirectoryResolver::from_env()?.resolve()?;
    *cached = Some(resolved.clone());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn preferred_directory_is_created() {
        let temp = tempdir().unwrap();
        let preferred = temp.path().join("Guild Wars 2").join("addons").join("blishhud");
        let resolver = BaseDirectoryResolver {
            preferred: Some((preferred.clone(), BaseDirSource::Documents)),
            fallback: temp.path().to_path_buf(),
            legacy_dir: temp.path().to_path_buf(),
        };

        let base = resolver.resolve().unwrap();
        assert_eq!(base.path, preferred);
        assert_eq!(base.source, BaseDirSource::Documents);
        assert!(preferred.is_dir());
        assert_eq!(base.migration, MigrationOutcome::NoLegacyFile);
    }

    #[test]
    fn falls_back_when_preferred_is_unusable() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file, not dir").unwrap();
        let resolver = BaseDirectoryResolver {
            preferred: Some((blocker.join("base"), BaseDirSource::Documents)),
            fallback: temp.path().to_path_buf(),
            legacy_dir: temp.path().to_path_buf(),
        };

        let base = resolver.resolve().unwrap();
        assert_eq!(base.path, temp.path());
        assert_eq!(base.source, BaseDirSource::WorkingDirectory);
    }

    #[test]
    fn no_preferred_location_uses_fallback() {
        let temp = tempdir().unwrap();
        let resolver = BaseDirectoryResolver {
            preferred: None,
            fallback: temp.path().to_path_buf(),
            legacy_dir: temp.path().to_path_buf(),
        };
        assert_eq!(resolver.resolve().unwrap().source, BaseDirSource::WorkingDirectory);
    }

    #[test]
    fn migrates_legacy_settings_once() {
        let legacy = tempdir().unwrap();
        let data = tempdir().unwrap();
        fs::write(legacy.path().join(SETTINGS_FILE_NAME), b"{}").unwrap();
        let resolver = BaseDirectoryResolver::with_base(data.path(), legacy.path());

        let first = resolver.resolve().unwrap();
        assert_eq!(first.migration, MigrationOutcome::Copied);
        assert_eq!(fs::read(first.settings_path()).unwrap(), b"{}");

        let second = resolver.resolve().unwrap();
        assert_eq!(second.migration, MigrationOutcome::DestinationExists);
        assert_eq!(first.path, second.path);
    }

    #[test]
    fn register_directories_under_base() {
        let data = tempdir().unwrap();
        let base = BaseDirectoryResolver::with_base(data.path(), data.path())
            .resolve()
            .unwrap();
        let registry = base.register_directories(["cache"]).unwrap();
        assert_eq!(registry.lookup("CACHE"), Some(data.path().join("cache").as_path()));
    }

    #[test]
    fn process_wide_base_dir_is_resolved_once() {
        use crate::paths::platform::DATA_DIR_ENV;
        use crate::paths::test_utils::ScopedEnvVar;

        let data = tempdir().unwrap();
        let _env = ScopedEnvVar::set(DATA_DIR_ENV, data.path().to_string_lossy().as_ref());

        let first = base_dir().unwrap();
        let second = base_dir().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.source, BaseDirSource::EnvOverride);
    }

    #[test]
    fn display_lists_key_value_pairs() {
        let data = tempdir().unwrap();
        let base = BaseDirectoryResolver::with_base(data.path(), data.path())
            .resolve()
            .unwrap();
        let output = base.to_string();
        assert!(output.contains("base_dir = "));
        assert!(output.contains("settings_path = "));
        assert!(output.contains("migration = "));
    }
}

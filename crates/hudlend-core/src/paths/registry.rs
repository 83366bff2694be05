//! Named directories under the base directory.
//!
//! Subsystems declare the logical directories they need ("cache", "logs",
//! ...) and get back a registry that maps each name to an absolute path.
//! Every directory exists on disk by the time the registry is returned.
//! Names are case-insensitive.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use super::ensure::{DirectoryCreationStrategy, ensure_directory};
use super::error::PathError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegisteredDirectory {
    name: String,
    path: PathBuf,
}

/// Read-only mapping of logical directory names to created directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRegistry {
    base: PathBuf,
    // Keyed by the lowercased name; the first spelling seen is kept.
    directories: BTreeMap<String, RegisteredDirectory>,
}

impl DirectoryRegistry {
    /// Create `base/<name>` for every name and return the mapping.
    ///
    /// Names differing only by case are registered once. Creating a
    /// directory that already exists is not an error; any other creation
    /// failure aborts registration.
    pub fn register<I, S>(base: &Path, names: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut directories = BTreeMap::new();

        for name in names {
            let name = name.as_ref();
            validate_name(name)?;

            let key = name.to_lowercase();
            if directories.contains_key(&key) {
                continue;
            }

            let path = base.join(name);
            ensure_directory(&path, DirectoryCreationStrategy::AutoCreate)?;
            directories.insert(
                key,
                RegisteredDirectory {
                    name: name.to_string(),
                    path,
                },
            );
        }

        tracing::debug!(
            base = %base.display(),
            count = directories.len(),
            "Registered directories"
        );

        Ok(Self {
            base: base.to_path_buf(),
            directories,
        })
    }

    /// Absolute path for `name`, or `None` if it was never registered.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.directories
            .get(&name.to_lowercase())
            .map(|dir| dir.path.as_path())
    }

    /// Names as they were first registered, sorted case-insensitively.
    #[must_use]
    pub fn registered_directories(&self) -> Vec<&str> {
        self.directories.values().map(|dir| dir.name.as_str()).collect()
    }

    /// `(name, path)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.directories
            .values()
            .map(|dir| (dir.name.as_str(), dir.path.as_path()))
    }

    /// The directory everything is registered under.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// A name must be exactly one normal path component.
fn validate_name(name: &str) -> Result<(), PathError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(PathError::InvalidName(name.to_string())),
    }
}

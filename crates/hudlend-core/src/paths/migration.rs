//! One-time migration of the legacy settings file.
//!
//! Older releases kept `settings.json` next to the executable. Newer ones
//! keep it under the base directory. On startup the old file is copied over
//! if, and only if, the new location does not have one yet. Failures are
//! logged and otherwise ignored: the application then starts with default
//! settings.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use serde::Serialize;

/// Name of the settings file being migrated.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// What the migration step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The legacy file was copied to the new location.
    Copied,
    /// The new location already has a settings file; nothing was touched.
    DestinationExists,
    /// There is no legacy file to migrate.
    NoLegacyFile,
    /// The copy failed; the application starts fresh.
    Failed(String),
}

impl MigrationOutcome {
    /// Whether the legacy file ended up at the new location.
    #[must_use]
    pub const fn copied(&self) -> bool {
        matches!(self, Self::Copied)
    }
}

/// Copy `legacy` to `destination` unless `destination` already exists.
///
/// Never overwrites and never fails: every error becomes
/// [`MigrationOutcome::Failed`]. A partially written destination is removed
/// so a later start can retry.
pub fn migrate_legacy_file(legacy: &Path, destination: &Path) -> MigrationOutcome {
    if destination.exists() {
        return MigrationOutcome::DestinationExists;
    }
    if !legacy.is_file() {
        return MigrationOutcome::NoLegacyFile;
    }

    match copy_new(legacy, destination) {
        Ok(bytes) => {
            tracing::info!(
                from = %legacy.display(),
                to = %destination.display(),
                bytes,
                "Migrated legacy settings file"
            );
            MigrationOutcome::Copied
        }
        // Lost a race with another writer; theirs wins.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => MigrationOutcome::DestinationExists,
        Err(e) => {
            tracing::warn!(
                from = %legacy.display(),
                to = %destination.display(),
                error = %e,
                "Failed to migrate legacy settings file; starting with defaults"
            );
            MigrationOutcome::Failed(e.to_string())
        }
    }
}

fn copy_new(legacy: &Path, destination: &Path) -> io::Result<u64> {
    let mut source = File::open(legacy)?;
    let mut target = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let copied = io::copy(&mut source, &mut target).and_then(|bytes| target.sync_all().map(|()| bytes));
    if copied.is_err() {
        drop(target);
        let _ = fs::remove_file(destination);
    }
    copied
}

//! Path utilities for the overlay's writable directories.
//!
//! This module provides the canonical path resolution for the overlay:
//! - The base directory everything is written under
//! - The one-time migration of a legacy settings file into it
//! - Named subdirectories registered by subsystems
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Directory creation failures are hard errors; the migration never fails
//! - OS-specific logic is kept private in `platform`

mod base;
mod ensure;
mod error;
mod migration;
mod platform;
mod registry;

#[cfg(test)]
mod test_utils;

// Error type
pub use error::PathError;

// Base directory
pub use base::{BaseDirSource, BaseDirectory, BaseDirectoryResolver, base_dir};

// Platform defaults
pub use platform::{DATA_DIR_ENV, DEFAULT_BASE_DIR_RELATIVE, documents_base_dir};

// Legacy settings migration
pub use migration::{MigrationOutcome, SETTINGS_FILE_NAME, migrate_legacy_file};

// Named directories
pub use registry::DirectoryRegistry;

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};

//! Core of the hudlend overlay runtime.
//!
//! - [`graphics`]: lends the single shared graphics device to one thread at
//!   a time, with high/low priority tiers and scoped release.
//! - [`paths`]: resolves the writable base directory, migrates the legacy
//!   settings file, and creates named subdirectories.
#![deny(unused_crate_dependencies)]

pub mod graphics;
pub mod paths;

// Re-export commonly used types for convenience
pub use graphics::{
    DesignatedThread, DeviceLendingService, Lease, LeaseHandle, LeaseInfo, LendError,
    LendingSnapshot, NoPrimaryThread, Priority, PrimaryThreadProbe, ReleaseRejected,
    ThreadIdentity,
};
pub use paths::{
    BaseDirSource, BaseDirectory, BaseDirectoryResolver, DirectoryRegistry, MigrationOutcome,
    PathError, base_dir,
};

// Only used by the integration tests
#[cfg(test)]
use rand as _;
#[cfg(test)]
use tracing_subscriber as _;

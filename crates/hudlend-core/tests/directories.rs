//! Integration tests for base directory resolution and directory registration.

use std::fs;

use hudlend_core::paths::{
    BaseDirSource, BaseDirectoryResolver, DirectoryRegistry, MigrationOutcome, SETTINGS_FILE_NAME,
};
use tempfile::tempdir;

/// Registering `cache` and `logs` under an application base directory.
#[test]
fn registered_directories_exist_and_resolve_case_insensitively() {
    let temp = tempdir().expect("tempdir");
    let app = temp.path().join("app");

    let base = BaseDirectoryResolver::with_base(&app, temp.path())
        .resolve()
        .expect("resolve base dir");
    let registry = base
        .register_directories(["cache", "logs"])
        .expect("register directories");

    assert!(app.join("cache").is_dir());
    assert!(app.join("logs").is_dir());
    assert_eq!(registry.lookup("Cache"), registry.lookup("cache"));
    assert_eq!(registry.lookup("cache"), Some(app.join("cache").as_path()));
    assert_eq!(registry.lookup("screenshots"), None);
}

#[test]
fn registration_is_idempotent() {
    let temp = tempdir().expect("tempdir");

    let first = DirectoryRegistry::register(temp.path(), ["cache", "logs"]).expect("first");
    let second = DirectoryRegistry::register(temp.path(), ["logs", "CACHE"]).expect("second");

    for name in ["cache", "logs"] {
        assert_eq!(first.lookup(name), second.lookup(name), "{name}");
    }
}

#[test]
fn resolution_never_overwrites_migrated_settings() {
    let legacy = tempdir().expect("legacy dir");
    let data = tempdir().expect("data dir");
    fs::write(legacy.path().join(SETTINGS_FILE_NAME), br#"{"v":1}"#).unwrap();

    let resolver = BaseDirectoryResolver::with_base(data.path(), legacy.path());
    assert_eq!(resolver.resolve().unwrap().migration, MigrationOutcome::Copied);

    // The user changes settings in the new location; a restart must keep them.
    fs::write(data.path().join(SETTINGS_FILE_NAME), br#"{"v":2}"#).unwrap();
    let again = resolver.resolve().unwrap();

    assert_eq!(again.migration, MigrationOutcome::DestinationExists);
    assert_eq!(
        fs::read(data.path().join(SETTINGS_FILE_NAME)).unwrap(),
        br#"{"v":2}"#
    );
}

#[test]
fn resolution_without_legacy_file_starts_fresh() {
    let legacy = tempdir().expect("legacy dir");
    let data = tempdir().expect("data dir");
    let resolver = BaseDirectoryResolver::with_base(data.path(), legacy.path());

    for _ in 0..2 {
        let base = resolver.resolve().expect("resolve");
        assert_eq!(base.migration, MigrationOutcome::NoLegacyFile);
        assert_eq!(base.source, BaseDirSource::Explicit);
        assert!(!base.settings_path().exists());
    }
}

#[test]
fn directory_creation_failure_is_fatal() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let result = BaseDirectoryResolver::with_base(blocker.join("app"), temp.path()).resolve();
    assert!(result.is_err(), "explicit base directory must not silently fall back");
}

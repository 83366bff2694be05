//! Errors from base-directory resolution and directory registration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a directory could not be resolved, created or registered.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("cannot locate the user's home folder")]
    HomeUnknown,

    #[error("cannot locate the user's documents folder")]
    DocumentsUnknown,

    #[error("cannot read the working directory")]
    WorkingDir(#[source] io::Error),

    /// A user-supplied path was empty or whitespace.
    #[error("path is blank")]
    Blank,

    /// Something other than a directory already sits at the path.
    #[error("{0} exists and is not a directory")]
    OccupiedByFile(PathBuf),

    /// The directory is absent and the caller did not allow creating it.
    #[error("directory {0} does not exist")]
    Missing(PathBuf),

    #[error("failed to create {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The write probe could not be written, read back or matched.
    #[error("{path} is not writable: {detail}")]
    NotWritable { path: PathBuf, detail: String },

    /// A logical directory name that is not exactly one path component.
    #[error("{0:?} is not a usable directory name")]
    InvalidName(String),
}

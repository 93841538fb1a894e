use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while scanning a directory or removing files from it.
#[derive(Debug, Error)]
pub enum Error {
    /// Target directory does not exist
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Target path exists but is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory could not be listed
    #[error("cannot read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Modification time of an entry could not be read
    #[error("cannot read modification time of {path}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file selected for deletion could not be removed
    #[error("cannot remove {path}: {source}")]
    Deletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Map an IO error on the target directory to an input error.
    pub fn from_dir_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Error::DirectoryNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_path_buf()),
            _ => Error::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &Path {
        match self {
            Error::DirectoryNotFound(path)
            | Error::NotADirectory(path)
            | Error::PermissionDenied(path)
            | Error::Unreadable { path, .. }
            | Error::Timestamp { path, .. }
            | Error::Deletion { path, .. } => path,
        }
    }
}

/// Result type for scan operations
pub type Result<T> = std::result::Result<T, Error>;

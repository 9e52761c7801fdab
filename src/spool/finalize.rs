//! Local housekeeping after a successful upload.
//!
//! A delivered file is either deleted or renamed with the uploaded marker,
//! then the containing directory is fsynced. Failures here are reported to
//! the caller for logging only: the upload itself already succeeded.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fsync::fsync_parent;
use super::marker::uploaded_path;

/// Errors that can occur while finalizing a delivered file.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// Deleting the delivered file failed.
    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Renaming the delivered file failed.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path has no file name to mark.
    #[error("cannot mark {} as uploaded: no file name", path.display())]
    NoFileName { path: PathBuf },

    /// The directory could not be synced after the change.
    #[error("failed to sync directory of {}: {source}", path.display())]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to a delivered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalized {
    /// The file was removed.
    Deleted,

    /// The file was renamed to the given path.
    Renamed(PathBuf),
}

/// Deletes or marks the delivered file at `path`.
///
/// # Errors
///
/// Returns `FinalizeError` if the filesystem operation or the directory sync
/// fails. The caller is expected to log and continue.
pub fn finalize_delivered(path: &Path, delete: bool) -> Result<Finalized, FinalizeError> {
    let finalized = if delete {
        std::fs::remove_file(path).map_err(|source| FinalizeError::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        Finalized::Deleted
    } else {
        let to = uploaded_path(path).ok_or_else(|| FinalizeError::NoFileName {
            path: path.to_path_buf(),
        })?;
        std::fs::rename(path, &to).map_err(|source| FinalizeError::Rename {
            from: path.to_path_buf(),
            to: to.clone(),
            source,
        })?;
        Finalized::Renamed(to)
    };

    fsync_parent(path).map_err(|source| FinalizeError::Sync {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(finalized)
}

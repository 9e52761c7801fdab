//! The "already uploaded" naming convention.
//!
//! A delivered file that is kept on disk is renamed by inserting
//! [`UPLOADED_MARKER`] before its final extension:
//!
//! ```text
//! clip.mp3        -> clip_uploaded.mp3
//! 2024-01-01.tar.gz -> 2024-01-01.tar_uploaded.gz
//! recording       -> recording_uploaded
//! ```
//!
//! The startup scan recognises delivered files by the same rule, so the two
//! functions here must stay in lockstep: for every name `n`,
//! `is_uploaded_name(uploaded_name(n))` holds.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Token inserted into the names of delivered files.
pub const UPLOADED_MARKER: &str = "_uploaded";

/// Splits a file name into stem and extension at the last `.`.
///
/// The extension includes the dot. Names without a dot have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    }
}

/// Returns the name a delivered file is renamed to.
pub fn uploaded_name(name: &OsStr) -> OsString {
    match name.to_str() {
        Some(name) => {
            let (stem, ext) = split_extension(name);
            OsString::from(format!("{stem}{UPLOADED_MARKER}{ext}"))
        }
        None => {
            // Not UTF-8: no reliable extension split, append instead.
            let mut renamed = name.to_os_string();
            renamed.push(UPLOADED_MARKER);
            renamed
        }
    }
}

/// Returns the path a delivered file is renamed to.
///
/// Only the final path component changes. Returns `None` for paths without
/// a file name (`/`, `..`).
pub fn uploaded_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    Some(path.with_file_name(uploaded_name(name)))
}

/// Returns true if `name` marks an already delivered file.
pub fn is_uploaded_name(name: &OsStr) -> bool {
    match name.to_str() {
        Some(name) => split_extension(name).0.ends_with(UPLOADED_MARKER),
        None => name.to_string_lossy().ends_with(UPLOADED_MARKER),
    }
}

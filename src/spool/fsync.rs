//! Directory fsync after finalizing a delivered file.
//!
//! Renames and unlinks only update the directory entry. Until the directory
//! itself is synced, a power loss can bring back the original name, and the
//! next startup scan would upload the recording a second time.

use std::fs::File;
use std::io;
use std::path::Path;

/// Syncs a directory so renames and deletions inside it are durable.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    File::open(dir_path)?.sync_all()
}

/// Syncs the directory containing `path`.
///
/// Relative paths with no parent component sync the current directory.
pub fn fsync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fsync_dir(parent),
        _ => fsync_dir(Path::new(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fsync_dir_after_rename() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("clip.mp3");
        let to = dir.path().join("clip_uploaded.mp3");
        File::create(&from).unwrap();
        std::fs::rename(&from, &to).unwrap();

        fsync_dir(dir.path()).unwrap();
    }

    #[test]
    fn fsync_parent_of_missing_file_still_syncs_directory() {
        let dir = tempdir().unwrap();
        fsync_parent(&dir.path().join("gone.mp3")).unwrap();
    }

    #[test]
    fn fsync_dir_fails_on_nonexistent() {
        let result = fsync_dir(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_err());
    }
}

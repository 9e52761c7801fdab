//! Startup reconciliation of output directories.
//!
//! After a restart, recordings written by the previous run may not have been
//! delivered yet. The scan walks an output's base directory and enqueues every
//! file that is not marked as uploaded. Already queued paths are deduplicated
//! by the store, so running the scan alongside live producers is safe.

use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::store::DeliveryStore;
use crate::types::DeliveryConfig;

use super::marker::is_uploaded_name;

/// Returns true if a regular file at `path` is still waiting for delivery.
///
/// A file is pending unless its name carries the uploaded marker or, when
/// the configuration has a suffix filter, its full path does not end with
/// that suffix.
pub fn is_pending_file(config: &DeliveryConfig, path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if is_uploaded_name(name) {
        return false;
    }
    config.path_suffix_filter.is_empty()
        || path
            .as_os_str()
            .as_encoded_bytes()
            .ends_with(config.path_suffix_filter.as_bytes())
}

/// Enqueues every pending file under `dir`.
///
/// Entries whose names start with `.` are skipped. Subdirectories are only
/// descended into when `recurse_dated_subdirectories` is set. Symlinks and
/// other special files are ignored. Directories that cannot be read are
/// logged and skipped.
///
/// Returns the number of files newly enqueued.
pub fn scan_directory(store: &DeliveryStore, config: &DeliveryConfig, dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot read output directory, skipping");
            return 0;
        }
    };

    // Sort by name for deterministic enqueue order
    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    let mut enqueued = 0;
    for entry in entries {
        if entry.file_name().as_encoded_bytes().starts_with(b".") {
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            if config.recurse_dated_subdirectories {
                enqueued += scan_directory(store, config, &path);
            }
        } else if file_type.is_file()
            && is_pending_file(config, &path)
            && store.enqueue(&path, config)
        {
            trace!(path = %path.display(), "Found undelivered file");
            enqueued += 1;
        }
    }

    debug!(dir = %dir.display(), enqueued, "Scanned output directory");
    enqueued
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs::File;
    use std::path::PathBuf;

    use super::*;
    use tempfile::tempdir;

    fn config() -> DeliveryConfig {
        DeliveryConfig::new("http://localhost/upload")
    }

    fn pending_paths(store: &DeliveryStore) -> BTreeSet<PathBuf> {
        store.snapshot().into_iter().map(|t| t.path).collect()
    }

    #[test]
    fn skips_uploaded_and_hidden_files() {
        let dir = tempdir().unwrap();
        for name in ["a.mp3", "a_uploaded.mp3", ".hidden.mp3"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut cfg = config();
        cfg.path_suffix_filter = ".mp3".to_string();
        let store = DeliveryStore::new();

        let count = scan_directory(&store, &cfg, dir.path());

        assert_eq!(count, 1);
        assert_eq!(
            pending_paths(&store),
            BTreeSet::from([dir.path().join("a.mp3")])
        );
    }

    #[test]
    fn suffix_filter_excludes_other_files() {
        let dir = tempdir().unwrap();
        for name in ["a.mp3", "b.wav", "c.mp3.part"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut cfg = config();
        cfg.path_suffix_filter = ".mp3".to_string();
        let store = DeliveryStore::new();

        scan_directory(&store, &cfg, dir.path());

        assert_eq!(
            pending_paths(&store),
            BTreeSet::from([dir.path().join("a.mp3")])
        );
    }

    #[test]
    fn empty_filter_matches_everything() {
        let dir = tempdir().unwrap();
        for name in ["a.mp3", "b.wav", "notes"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let store = DeliveryStore::new();

        assert_eq!(scan_directory(&store, &config(), dir.path()), 3);
    }

    #[test]
    fn recurses_into_dated_subdirectories_when_enabled() {
        let dir = tempdir().unwrap();
        let dated = dir.path().join("2024-01-01");
        fs::create_dir(&dated).unwrap();
        File::create(dated.join("clip.mp3")).unwrap();

        let mut cfg = config();
        cfg.recurse_dated_subdirectories = true;
        let store = DeliveryStore::new();

        scan_directory(&store, &cfg, dir.path());

        assert_eq!(
            pending_paths(&store),
            BTreeSet::from([dated.join("clip.mp3")])
        );
    }

    #[test]
    fn does_not_descend_when_disabled() {
        let dir = tempdir().unwrap();
        let dated = dir.path().join("2024-01-01");
        fs::create_dir(&dated).unwrap();
        File::create(dated.join("clip.mp3")).unwrap();
        let store = DeliveryStore::new();

        assert_eq!(scan_directory(&store, &config(), dir.path()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn hidden_directories_are_not_descended() {
        let dir = tempdir().unwrap();
        let hidden = dir.path().join(".trash");
        fs::create_dir(&hidden).unwrap();
        File::create(hidden.join("clip.mp3")).unwrap();

        let mut cfg = config();
        cfg.recurse_dated_subdirectories = true;
        let store = DeliveryStore::new();

        assert_eq!(scan_directory(&store, &cfg, dir.path()), 0);
    }

    #[test]
    fn missing_directory_enqueues_nothing() {
        let dir = tempdir().unwrap();
        let store = DeliveryStore::new();

        assert_eq!(
            scan_directory(&store, &config(), &dir.path().join("nope")),
            0
        );
    }

    #[test]
    fn already_queued_files_are_not_counted_twice() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.mp3")).unwrap();
        let store = DeliveryStore::new();

        assert_eq!(scan_directory(&store, &config(), dir.path()), 1);
        assert_eq!(scan_directory(&store, &config(), dir.path()), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pending_predicate_matches_marker_rule() {
        let cfg = config();
        assert!(is_pending_file(&cfg, Path::new("/rec/a.mp3")));
        assert!(!is_pending_file(&cfg, Path::new("/rec/a_uploaded.mp3")));
        assert!(!is_pending_file(&cfg, Path::new("/rec/a_uploaded")));
    }
}

use crate::persistence::{self, RECORD_FILE_NAME, StoreError};
use crate::utils::to_relative_key;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version-control metadata directory, pruned wherever it appears.
pub const VCS_DIR_NAME: &str = ".git";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access directory '{}': {source}", path.display())]
    RootUnavailable { path: PathBuf, source: io::Error },

    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Record(#[from] StoreError),
}

/// Everything the selection model needs from disk at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Every eligible file under the root, depth-first in file-name order.
    pub inventory: Vec<String>,
    /// Saved selection entries that still exist in `inventory`.
    pub selected: Vec<String>,
}

/// Walk `root` and collect the relative path of every file below it.
///
/// Hidden files are included; `.git` subtrees are never entered and the root's
/// own selection record is left out. Unreadable entries are logged and skipped.
pub fn scan_files(root: &Path) -> Result<Vec<String>, ScanError> {
    let metadata = fs::metadata(root).map_err(|source| ScanError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    // A root we cannot list means the walk never starts.
    fs::read_dir(root).map_err(|source| ScanError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && entry.depth() > 0 && entry.file_name() == VCS_DIR_NAME)
        })
        .build();

    let mut inventory = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                let permission_denied = e
                    .io_error()
                    .is_some_and(|io| io.kind() == io::ErrorKind::PermissionDenied);
                if permission_denied {
                    debug!("skipping unreadable entry: {}", e);
                } else {
                    warn!("error during scan, skipping entry: {}", e);
                }
                continue;
            }
        };

        if entry.depth() == 0 || entry.file_type().is_none_or(|ft| ft.is_dir()) {
            continue;
        }
        if entry.depth() == 1 && entry.file_name() == RECORD_FILE_NAME {
            continue;
        }

        match to_relative_key(entry.path(), root) {
            Some(relative) => inventory.push(relative),
            None => warn!(
                "skipping '{}': path is not valid UTF-8",
                entry.path().display()
            ),
        }
    }

    debug!(files = inventory.len(), root = %root.display(), "scan complete");
    Ok(inventory)
}

/// Scan `root` and load its saved selection, dropping entries that no longer exist.
pub fn load_files_and_selection(root: &Path) -> Result<ScanResult, ScanError> {
    let inventory = scan_files(root)?;
    let saved = persistence::load(root)?;
    let selected = validate_selection(&inventory, saved);
    Ok(ScanResult {
        inventory,
        selected,
    })
}

/// Keep only the saved entries present in `inventory`, in saved order, without duplicates.
pub fn validate_selection(inventory: &[String], saved: Vec<String>) -> Vec<String> {
    let known: HashSet<&str> = inventory.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(saved.len());
    for path in saved {
        if !known.contains(path.as_str()) {
            info!(
                "previously selected file '{}' not found during scan, removing from list",
                path
            );
            continue;
        }
        if seen.insert(path.clone()) {
            selected.push(path);
        }
    }
    selected
}

//! Directory walking and removal

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{trace, warn};

use crate::error::{WadfError, WadfResult};

/// Every regular file under `root`, sorted, skipping any entry whose name
/// is in `skip_names` (VC metadata directories).
///
/// `.gitignore` and hidden-file rules are not applied: deployments ship
/// dotfiles such as `.htaccess.template`.
pub fn walk_files(root: &Path, skip_names: &[&str]) -> WadfResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let skip: Vec<String> = skip_names.iter().map(|s| s.to_string()).collect();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !skip.iter().any(|s| s == name))
                .unwrap_or(true)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| WadfError::config(format!("Cannot list {}: {}", root.display(), e)))?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            trace!(path = %entry.path().display(), "found file");
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Remove a directory tree if it exists; failures are logged, not returned
pub fn remove_dir_quietly(dir: &Path) {
    if !dir.is_dir() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(dir) {
        warn!("Could not fully delete {}: {}", dir.display(), e);
    }
}

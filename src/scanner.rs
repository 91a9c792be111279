//! Workspace discovery of SFC documents

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Ignored folder list
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    ".github",
    "target",
    "dist",
    "build",
    "coverage",
];

/// Extensions recognized as single-file components
const SFC_EXTENSIONS: &[&str] = &["vue"];

/// Filter: returns true for folders that never contain project SFCs
fn should_skip(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && EXCLUDED_DIRS.contains(&entry.file_name().to_str().unwrap_or(""))
}

/// Check if a path points to an SFC document
#[must_use]
pub fn is_sfc_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SFC_EXTENSIONS.contains(&ext))
}

/// Scan a directory tree for SFC documents to transform
#[must_use]
pub fn scan_sfc_files(root: &Path) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !should_skip(entry))
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_sfc_file(entry.path()))
        .map(DirEntry::into_path)
        .collect();

    debug!(
        count = files.len(),
        root = %root.display(),
        "scanned workspace for sfc documents"
    );

    files
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Image extensions picked up from directories (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "raw", "hif", "arw"];

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub name: String,
    pub path: PathBuf,
}

impl ImageEntry {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        Some(Self { name, path })
    }
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Collect image files from the given paths.
///
/// Directories contribute their visible image files (not recursive); files
/// named explicitly are taken as they are. The result is sorted and free of
/// duplicates.
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageEntry>, ScannerError> {
    let mut entries = Vec::new();

    for target in paths {
        if !target.exists() {
            return Err(ScannerError::PathNotFound(target.clone()));
        }

        if target.is_dir() {
            entries.extend(scan_directory(target)?);
        } else if let Some(entry) = ImageEntry::from_path(target.clone()) {
            trace!(path = ?target, "Explicit file");
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries.dedup_by(|a, b| a.path == b.path);

    debug!(count = entries.len(), "Collected images");
    Ok(entries)
}

fn scan_directory(target: &Path) -> Result<Vec<ImageEntry>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    let read_dir = fs::read_dir(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let path = entry?.path();

        if !path.is_file() {
            continue;
        }
        let Some(entry) = ImageEntry::from_path(path) else {
            continue;
        };
        if entry.name.starts_with('.') {
            trace!(name = %entry.name, "Skipping hidden file");
            continue;
        }
        if !is_image_file(&entry.path) {
            trace!(name = %entry.name, "Skipping non-image file");
            continue;
        }

        entries.push(entry);
    }

    Ok(entries)
}

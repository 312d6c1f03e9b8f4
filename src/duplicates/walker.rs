use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::common::errors::DedupError;

/// Check if a file has one of the recognized image extensions (case-insensitive)
pub fn is_image(path: &Path, extensions: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase()))
        .unwrap_or(false)
}

/// Collect every image file below `root`.
///
/// Entries are visited in file-name order inside each directory, so two walks
/// of the same tree return the same sequence. Links are not followed.
pub fn enumerate_images(
    root: &Path,
    extensions: &BTreeSet<String>,
) -> Result<Vec<PathBuf>, DedupError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            return Err(DedupError::Io {
                path: root.to_path_buf(),
                source: e,
            });
        }
        _ => {
            return Err(DedupError::InvalidDirectory {
                path: root.to_path_buf(),
            });
        }
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_image(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Enumerated {} images under {}", files.len(), root.display());
    Ok(files)
}

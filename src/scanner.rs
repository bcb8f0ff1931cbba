//! PDF discovery on the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that stop a scan before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a PDF file: {0}")]
    NotAPdf(PathBuf),
}

/// Whether a path carries a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Start scanning `root` for PDF files.
///
/// A file root yields itself (or fails with [`ScanError::NotAPdf`]); a
/// directory root is walked recursively on demand. Directories that cannot
/// be listed are logged and skipped.
pub fn scan(root: &Path) -> Result<PdfFiles, ScanError> {
    let metadata = fs::metadata(root).map_err(|_| ScanError::PathNotFound(root.to_path_buf()))?;

    if metadata.is_dir() {
        return Ok(PdfFiles {
            pending_dirs: vec![root.to_path_buf()],
            pending_files: Vec::new(),
        });
    }

    if !is_pdf(root) {
        return Err(ScanError::NotAPdf(root.to_path_buf()));
    }

    Ok(PdfFiles {
        pending_dirs: Vec::new(),
        pending_files: vec![root.to_path_buf()],
    })
}

/// Lazy iterator over the PDFs under a scan root.
#[derive(Debug)]
pub struct PdfFiles {
    pending_dirs: Vec<PathBuf>,
    pending_files: Vec<PathBuf>,
}

impl PdfFiles {
    /// List one directory, queueing its subdirectories and PDF files.
    fn expand(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinked directories are not descended into (avoids cycles),
            // symlinked files are resolved.
            if file_type.is_dir() {
                self.pending_dirs.push(path);
            } else if is_pdf(&path) && fs::metadata(&path).is_ok_and(|m| m.is_file()) {
                self.pending_files.push(path);
            }
        }
    }
}

impl Iterator for PdfFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if let Some(file) = self.pending_files.pop() {
                return Some(file);
            }
            let dir = self.pending_dirs.pop()?;
            self.expand(&dir);
        }
    }
}

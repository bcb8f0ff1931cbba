//! Classification-only pass over a directory tree.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::processor::is_generated_output;
use crate::analysis::Classifier;
use crate::scanner::{scan, ScanError};

/// PDFs under a root, grouped by whether they need OCR.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryAnalysis {
    pub needs_ocr: Vec<PathBuf>,
    pub has_ocr: Vec<PathBuf>,
    /// Documents that could not be read, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl DirectoryAnalysis {
    pub fn total(&self) -> usize {
        self.needs_ocr.len() + self.has_ocr.len() + self.unreadable.len()
    }
}

/// Classify every PDF under `root` without writing anything.
///
/// Outputs of earlier runs (`<stem><suffix>.pdf` next to `<stem>.pdf`) found
/// while walking a directory are left out; a file root is always classified.
/// `on_file` is called before each document is read.
pub fn analyze_paths(
    root: &Path,
    classifier: &Classifier,
    suffix: &str,
    mut on_file: impl FnMut(&Path),
) -> Result<DirectoryAnalysis, ScanError> {
    let mut analysis = DirectoryAnalysis::default();
    let files = scan(root)?;
    let walking = root.is_dir();

    for path in files {
        if walking && is_generated_output(&path, suffix) {
            continue;
        }
        on_file(&path);

        match classifier.decide(&path) {
            Ok(decision) if decision.needs_ocr => analysis.needs_ocr.push(path),
            Ok(_) => analysis.has_ocr.push(path),
            Err(e) => {
                tracing::warn!("Error analyzing {}: {}", path.display(), e);
                analysis.unreadable.push((path, e.to_string()));
            }
        }
    }

    Ok(analysis)
}

//! Per-page text access for PDF documents.
//!
//! The classifier only needs the ordered text of each page, so readers are
//! hidden behind [`PdfTextReader`]. [`PopplerReader`] is the default and
//! shells out to `pdfinfo`/`pdftotext`.

mod poppler;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::ToolError;

pub use poppler::{PopplerConfig, PopplerReader};

/// Errors reading text out of a PDF.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Unreadable PDF {path}: {reason}")]
    UnreadablePdf { path: PathBuf, reason: String },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Wrap a tool failure for the given document.
    pub(crate) fn from_tool(path: &Path, err: ToolError) -> Self {
        match err {
            ToolError::NotFound(tool) => ReadError::ToolNotFound(tool),
            ToolError::Failed { message, .. } => ReadError::UnreadablePdf {
                path: path.to_path_buf(),
                reason: message,
            },
            ToolError::Io(e) => ReadError::Io(e),
        }
    }
}

/// Source of per-page text for a PDF file.
pub trait PdfTextReader: Send + Sync {
    /// Extract the embedded text of every page, in page order.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ReadError>;

    /// Check if the reader's dependencies are installed.
    fn is_available(&self) -> bool {
        true
    }
}

//! Poppler-backed text reader (`pdfinfo` + `pdftotext`).

use std::path::Path;
use std::process::Command;

use super::{PdfTextReader, ReadError};
use crate::utils::{check_binary, handle_cmd_output};

/// Binaries used by [`PopplerReader`].
#[derive(Debug, Clone)]
pub struct PopplerConfig {
    pub pdfinfo_path: String,
    pub pdftotext_path: String,
}

impl Default for PopplerConfig {
    fn default() -> Self {
        Self {
            pdfinfo_path: "pdfinfo".to_string(),
            pdftotext_path: "pdftotext".to_string(),
        }
    }
}

/// Reads page text with Poppler's command-line tools.
#[derive(Debug, Clone, Default)]
pub struct PopplerReader {
    config: PopplerConfig,
}

impl PopplerReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PopplerConfig) -> Self {
        Self { config }
    }

    /// Get the page count of a PDF via `pdfinfo`.
    ///
    /// `pdfinfo` exits non-zero for corrupt files and for encrypted files
    /// it cannot open, both of which surface as [`ReadError::UnreadablePdf`].
    pub fn page_count(&self, path: &Path) -> Result<u32, ReadError> {
        let output = Command::new(&self.config.pdfinfo_path).arg(path).output();
        let stdout = handle_cmd_output(output, &self.config.pdfinfo_path)
            .map_err(|e| ReadError::from_tool(path, e))?;

        parse_page_count(&stdout).ok_or_else(|| ReadError::UnreadablePdf {
            path: path.to_path_buf(),
            reason: "pdfinfo did not report a page count".to_string(),
        })
    }

    /// Extract the whole document with one `pdftotext` run.
    ///
    /// Pages come back separated by form feeds.
    pub fn document_text(&self, path: &Path) -> Result<String, ReadError> {
        let output = Command::new(&self.config.pdftotext_path)
            .args(["-enc", "UTF-8"])
            .arg(path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, &self.config.pdftotext_path)
            .map_err(|e| ReadError::from_tool(path, e))
    }
}

impl PdfTextReader for PopplerReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ReadError> {
        let page_count = self.page_count(path)?;
        tracing::debug!("{} has {} pages", path.display(), page_count);

        if page_count == 0 {
            return Ok(Vec::new());
        }
        let text = self.document_text(path)?;
        Ok(split_pages(&text, page_count as usize))
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.pdfinfo_path).is_some()
            && check_binary(&self.config.pdftotext_path).is_some()
    }
}

/// Extract the `Pages:` field from `pdfinfo` output.
fn parse_page_count(info: &str) -> Option<u32> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}

/// Split `pdftotext` output into exactly `page_count` pages.
///
/// pdftotext terminates every page with a form feed, so the piece after the
/// last one is dropped. Missing pages are filled in as empty.
fn split_pages(text: &str, page_count: usize) -> Vec<String> {
    let mut pages: Vec<String> = text
        .split('\u{c}')
        .take(page_count)
        .map(str::to_string)
        .collect();
    pages.resize(page_count, String::new());
    pages
}

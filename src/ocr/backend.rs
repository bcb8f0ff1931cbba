//! OCR engine abstraction.

use std::path::Path;

use thiserror::Error;

use crate::utils::ToolError;

/// Errors from OCR engines.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ToolError> for OcrError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(tool) => OcrError::EngineNotAvailable(format!(
                "{} not found (install ocrmypdf)",
                tool
            )),
            ToolError::Failed { tool, message } => {
                OcrError::OcrFailed(format!("{}: {}", tool, message))
            }
            ToolError::Io(e) => OcrError::Io(e),
        }
    }
}

/// An engine that writes a searchable copy of a PDF.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for display.
    fn name(&self) -> &str;

    /// Check if the engine's dependencies are installed.
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this engine available.
    fn availability_hint(&self) -> String;

    /// OCR `input` and write the result to `output`.
    ///
    /// `language` is a Tesseract language code such as `eng` or `eng+fra`.
    /// The input file must not be modified.
    fn ocr(&self, input: &Path, output: &Path, language: &str) -> Result<(), OcrError>;
}

/// Validate a Tesseract language code before it reaches a command line.
///
/// Accepts `[A-Za-z0-9_+]` up to 20 characters, e.g. `eng`, `eng+deu`, `chi_sim`.
pub fn validate_language(lang: &str) -> Result<(), OcrError> {
    if lang.is_empty() || lang.len() > 20 {
        return Err(OcrError::InvalidLanguage(format!(
            "'{}' must be 1-20 characters",
            lang
        )));
    }
    if let Some(c) = lang
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '+' && *c != '_')
    {
        return Err(OcrError::InvalidLanguage(format!(
            "'{}' contains invalid character '{}'",
            lang, c
        )));
    }
    Ok(())
}

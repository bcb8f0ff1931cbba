//! `ocrmypdf` engine.
//!
//! Rasterises scanned pages, runs Tesseract on them and embeds the
//! recognised text as an invisible layer over the original page images.

use std::path::Path;
use std::process::{Command, Stdio};

use super::backend::{validate_language, OcrEngine, OcrError};
use crate::utils::{check_binary, check_cmd_status};

/// Configuration for the `ocrmypdf` engine.
#[derive(Debug, Clone)]
pub struct OcrMyPdfConfig {
    /// Path to the ocrmypdf executable (default: "ocrmypdf", resolved via PATH).
    pub binary: String,
    /// Leave pages that already carry text untouched.
    pub skip_text: bool,
    /// Straighten skewed pages before OCR.
    pub deskew: bool,
    /// Number of parallel page workers (default: ocrmypdf decides).
    pub jobs: Option<usize>,
}

impl Default for OcrMyPdfConfig {
    fn default() -> Self {
        Self {
            binary: "ocrmypdf".to_string(),
            skip_text: true,
            deskew: true,
            jobs: None,
        }
    }
}

/// OCR engine backed by the `ocrmypdf` command-line tool.
#[derive(Debug, Clone, Default)]
pub struct OcrMyPdfEngine {
    config: OcrMyPdfConfig,
}

impl OcrMyPdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OcrMyPdfConfig) -> Self {
        Self { config }
    }

    /// Build the command line for one document.
    fn command(&self, input: &Path, output: &Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-l").arg(language);

        if self.config.skip_text {
            cmd.arg("--skip-text");
        }
        if self.config.deskew {
            cmd.arg("--deskew");
        }
        if let Some(jobs) = self.config.jobs {
            cmd.arg("-j").arg(jobs.to_string());
        }

        cmd.arg("-q").arg(input).arg(output);
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl OcrEngine for OcrMyPdfEngine {
    fn name(&self) -> &str {
        "ocrmypdf"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.binary).is_some()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "ocrmypdf is available".to_string()
        } else {
            "ocrmypdf not installed. Install with: apt install ocrmypdf (or pip install ocrmypdf)"
                .to_string()
        }
    }

    fn ocr(&self, input: &Path, output: &Path, language: &str) -> Result<(), OcrError> {
        validate_language(language)?;

        tracing::debug!(
            "Running {} on {} -> {} (lang {})",
            self.config.binary,
            input.display(),
            output.display(),
            language
        );

        let result = self.command(input, output, language).output();
        check_cmd_status(result, &self.config.binary)?;
        Ok(())
    }
}

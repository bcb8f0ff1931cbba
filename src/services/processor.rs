//! Output-file orchestration for a single document.
//!
//! Decides where the searchable copy goes and whether the OCR engine runs.
//! Engine output is written to a temporary file in the destination
//! directory and renamed into place, so the output path only ever holds a
//! complete file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::OcrDecision;
use crate::ocr::{OcrEngine, OcrError};

/// Default suffix inserted before the output file's extension.
pub const DEFAULT_SUFFIX: &str = "_ocr";

/// Compute the output path for a source PDF.
///
/// `dir/report.pdf` with suffix `_ocr` becomes `dir/report_ocr.pdf`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(file_name)
}

/// Whether `path` looks like an output this tool produced for a sibling source.
pub fn is_generated_output(path: &Path, suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
        return false;
    };
    let Some(source_stem) = stem.strip_suffix(suffix) else {
        return false;
    };
    if source_stem.is_empty() {
        return false;
    }
    let source_name = match path.extension() {
        Some(ext) => format!("{}.{}", source_stem, ext.to_string_lossy()),
        None => source_stem.to_string(),
    };
    path.with_file_name(source_name).is_file()
}

/// Whether `output` names the same file as `input`.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Failure for an output path that would overwrite its own source.
fn overwrites_source(input: &Path, output: &Path, decision: Option<OcrDecision>) -> ProcessResult {
    ProcessResult::failed(
        input,
        output,
        format!("Output path is the source file: {}", output.display()),
        decision,
    )
}

/// Why a document was not sent to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The output file is already there and `force` is off.
    OutputExists,
    /// The document already has a text layer and `force` is off.
    NotNeeded,
    /// Dry run; nothing is written.
    DryRun,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::OutputExists => "output exists",
            SkipReason::NotNeeded => "does not need OCR",
            SkipReason::DryRun => "dry run",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// False only when reading or OCR failed.
    pub success: bool,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    /// Classifier verdict, when the document could be read.
    pub decision: Option<OcrDecision>,
    /// Whether the output path already existed when the document was handled.
    pub output_existed: bool,
}

impl ProcessResult {
    pub fn processed(input: &Path, output: &Path, decision: Option<OcrDecision>) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            success: true,
            skipped: None,
            error: None,
            decision,
            output_existed: false,
        }
    }

    pub fn skipped(
        input: &Path,
        output: &Path,
        reason: SkipReason,
        decision: Option<OcrDecision>,
    ) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            success: true,
            skipped: Some(reason),
            error: None,
            decision,
            output_existed: reason == SkipReason::OutputExists,
        }
    }

    pub fn failed(
        input: &Path,
        output: &Path,
        error: impl fmt::Display,
        decision: Option<OcrDecision>,
    ) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            success: false,
            skipped: None,
            error: Some(error.to_string()),
            decision,
            output_existed: false,
        }
    }

    /// Whether the engine produced an output file.
    pub fn is_processed(&self) -> bool {
        self.success && self.skipped.is_none()
    }

    pub fn is_failed(&self) -> bool {
        !self.success
    }

    /// Whether the classifier flagged this document for OCR.
    pub fn needs_ocr(&self) -> bool {
        self.decision.is_some_and(|d| d.needs_ocr)
    }
}

/// Per-run processing switches.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub suffix: String,
    pub language: String,
    pub force: bool,
    pub dry_run: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            language: "eng".to_string(),
            force: false,
            dry_run: false,
        }
    }
}

/// Applies the output-file rules and drives the OCR engine.
pub struct Processor {
    engine: Box<dyn OcrEngine>,
    options: ProcessOptions,
}

impl Processor {
    pub fn new(engine: Box<dyn OcrEngine>, options: ProcessOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Handle one classified document.
    pub fn process(&self, input: &Path, decision: &OcrDecision) -> ProcessResult {
        let output = output_path(input, &self.options.suffix);
        let decision = Some(*decision);
        if is_same_file(input, &output) {
            tracing::warn!("Refusing to overwrite source {}", input.display());
            return overwrites_source(input, &output, decision);
        }

        let output_existed = output.exists();

        if output_existed && !self.options.force {
            return ProcessResult::skipped(input, &output, SkipReason::OutputExists, decision);
        }

        if !decision.is_some_and(|d| d.needs_ocr) && !self.options.force {
            return ProcessResult::skipped(input, &output, SkipReason::NotNeeded, decision);
        }

        if self.options.dry_run {
            tracing::info!(
                "[dry run] would OCR {} -> {}",
                input.display(),
                output.display()
            );
            let mut result = ProcessResult::skipped(input, &output, SkipReason::DryRun, decision);
            result.output_existed = output_existed;
            return result;
        }

        match write_output(self.engine.as_ref(), input, &output, &self.options.language) {
            Ok(()) => {
                tracing::info!("Created {}", output.display());
                let mut result = ProcessResult::processed(input, &output, decision);
                result.output_existed = output_existed;
                result
            }
            Err(e) => {
                tracing::warn!("OCR failed for {}: {}", input.display(), e);
                ProcessResult::failed(input, &output, e, decision)
            }
        }
    }
}

/// Run the engine into a temp file beside `output`, then move it into place.
fn write_output(
    engine: &dyn OcrEngine,
    input: &Path,
    output: &Path,
    language: &str,
) -> Result<(), OcrError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Hidden and not ending in .pdf, so an interrupted run never leaves a
    // file that a later scan would pick up.
    let staging = tempfile::Builder::new()
        .prefix(".pdf-ocr-")
        .suffix(".part")
        .tempfile_in(parent)?;

    engine.ocr(input, staging.path(), language)?;

    // Temp files are created owner-only; give the copy the source's mode.
    fs::set_permissions(staging.path(), fs::metadata(input)?.permissions())?;
    staging.persist(output).map_err(|e| OcrError::Io(e.error))?;
    Ok(())
}

/// OCR a single PDF without classifying it first.
///
/// With `output` unset the searchable copy goes to the `_ocr` sibling. An
/// existing output is left alone unless `force` is set.
pub fn ocr_file(
    engine: &dyn OcrEngine,
    input: &Path,
    output: Option<&Path>,
    force: bool,
    language: &str,
) -> ProcessResult {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_path(input, DEFAULT_SUFFIX));

    if !input.is_file() {
        return ProcessResult::failed(
            input,
            &output,
            format!("Input not found: {}", input.display()),
            None,
        );
    }

    if is_same_file(input, &output) {
        return overwrites_source(input, &output, None);
    }

    let output_existed = output.exists();
    if output_existed && !force {
        return ProcessResult::skipped(input, &output, SkipReason::OutputExists, None);
    }

    match write_output(engine, input, &output, language) {
        Ok(()) => {
            let mut result = ProcessResult::processed(input, &output, None);
            result.output_existed = output_existed;
            result
        }
        Err(e) => ProcessResult::failed(input, &output, e, None),
    }
}

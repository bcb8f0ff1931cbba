//! Run driver: scan, classify and process every PDF under a root.
//!
//! Separated from UI concerns - emits events for progress tracking.
//! Documents are handled strictly one at a time.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::mpsc;

use super::processor::{is_generated_output, output_path, ProcessResult, Processor, SkipReason};
use crate::analysis::Classifier;
use crate::scanner::{scan, ScanError};

/// Events emitted during a run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Scanning of the root began.
    ScanStarted { root: PathBuf },
    /// A document is about to be classified and processed.
    DocumentStarted { path: PathBuf, index: usize },
    /// A document was handled (processed, skipped or failed).
    DocumentFinished { result: ProcessResult },
    /// A file was ignored because it is an output of an earlier run.
    OutputIgnored { path: PathBuf },
    /// All documents have been handled.
    RunComplete { summary: RunSummary },
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub needs_ocr: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Fold one document's result into the counts.
    pub fn record(&mut self, result: &ProcessResult) {
        self.scanned += 1;
        if result.needs_ocr() {
            self.needs_ocr += 1;
        }
        if result.is_failed() {
            self.failed += 1;
        } else if result.skipped.is_some() {
            self.skipped += 1;
        } else {
            self.processed += 1;
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Summary plus the per-document results it was built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub results: Vec<ProcessResult>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ProcessResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &ProcessResult> {
        self.results
            .iter()
            .filter(move |r| r.skipped == Some(reason))
    }

    /// Documents flagged for OCR that a dry run held back or whose output
    /// already exists.
    pub fn pending_ocr(&self) -> impl Iterator<Item = &ProcessResult> {
        self.results.iter().filter(|r| {
            r.needs_ocr()
                && matches!(
                    r.skipped,
                    Some(SkipReason::DryRun) | Some(SkipReason::OutputExists)
                )
        })
    }

    /// Documents that were read successfully and already carry text.
    pub fn with_text_layer(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.decision.is_some_and(|d| !d.needs_ocr))
            .count()
    }
}

/// Drives the scanner, classifier and processor over a directory tree.
pub struct Runner {
    classifier: Classifier,
    processor: Processor,
}

impl Runner {
    pub fn new(classifier: Classifier, processor: Processor) -> Self {
        Self {
            classifier,
            processor,
        }
    }

    /// Process every PDF under `root`.
    ///
    /// Only a missing root or a non-PDF file root abort the run; per-file
    /// failures are recorded in the report.
    pub fn run(
        &self,
        root: &Path,
        event_tx: &mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunReport, ScanError> {
        let suffix = &self.processor.options().suffix;
        let files = scan(root)?;
        // A file root is always handled, even when it looks like an output.
        let walking = root.is_dir();

        tracing::info!("Scanning {}", root.display());
        let _ = event_tx.send(RunEvent::ScanStarted {
            root: root.to_path_buf(),
        });

        let mut report = RunReport::default();

        for path in files {
            if walking && is_generated_output(&path, suffix) {
                tracing::debug!("Ignoring earlier output {}", path.display());
                let _ = event_tx.send(RunEvent::OutputIgnored { path });
                continue;
            }

            let _ = event_tx.send(RunEvent::DocumentStarted {
                path: path.clone(),
                index: report.results.len(),
            });

            let result = self.handle(&path);
            report.summary.record(&result);

            let _ = event_tx.send(RunEvent::DocumentFinished {
                result: result.clone(),
            });
            report.results.push(result);
        }

        tracing::info!(
            "Run complete: {} scanned, {} need OCR, {} processed, {} skipped, {} failed",
            report.summary.scanned,
            report.summary.needs_ocr,
            report.summary.processed,
            report.summary.skipped,
            report.summary.failed
        );
        let _ = event_tx.send(RunEvent::RunComplete {
            summary: report.summary,
        });

        Ok(report)
    }

    /// Classify one document and hand it to the processor.
    fn handle(&self, path: &Path) -> ProcessResult {
        match self.classifier.decide(path) {
            Ok(decision) => self.processor.process(path, &decision),
            Err(e) => {
                tracing::warn!("Error analyzing {}: {}", path.display(), e);
                let output = output_path(path, &self.processor.options().suffix);
                ProcessResult::failed(path, &output, e, None)
            }
        }
    }
}

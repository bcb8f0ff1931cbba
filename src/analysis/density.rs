//! Empty-page ratio heuristic.
//!
//! A page is "empty" when its extracted text is shorter than
//! [`Thresholds::min_chars_per_page`]. A document needs OCR when the share of
//! empty pages reaches [`Thresholds::empty_ratio`]. Every page is counted
//! before deciding since the ratio depends on the full page count.

use std::path::Path;

use serde::Serialize;

use crate::pdf::{PdfTextReader, ReadError};

/// Default characters below which a page is considered empty.
pub const DEFAULT_MIN_CHARS_PER_PAGE: usize = 10;

/// Default fraction of empty pages that triggers OCR.
pub const DEFAULT_EMPTY_RATIO: f64 = 0.5;

/// Cut-offs for the empty-page heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Pages with fewer characters than this are empty.
    pub min_chars_per_page: usize,
    /// Fraction of empty pages at or above which OCR is needed.
    pub empty_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_chars_per_page: DEFAULT_MIN_CHARS_PER_PAGE,
            empty_ratio: DEFAULT_EMPTY_RATIO,
        }
    }
}

/// Extracted text length of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTextSample {
    /// Zero-based page index.
    pub page: usize,
    /// Character count of the page's raw extracted text.
    pub chars: usize,
}

impl PageTextSample {
    pub fn from_text(page: usize, text: &str) -> Self {
        Self {
            page,
            chars: text.chars().count(),
        }
    }
}

/// Outcome of the empty-page heuristic for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OcrDecision {
    pub needs_ocr: bool,
    /// Empty pages over total pages, in `[0, 1]`.
    pub empty_ratio: f64,
    pub page_count: usize,
    pub empty_pages: usize,
}

/// Decide whether a document needs OCR from its per-page text lengths.
///
/// A document without pages has no extractable content and is reported as
/// needing OCR with a ratio of 1.0.
pub fn classify(page_chars: &[usize], thresholds: &Thresholds) -> OcrDecision {
    let page_count = page_chars.len();
    if page_count == 0 {
        return OcrDecision {
            needs_ocr: true,
            empty_ratio: 1.0,
            page_count: 0,
            empty_pages: 0,
        };
    }

    let empty_pages = page_chars
        .iter()
        .filter(|&&chars| chars < thresholds.min_chars_per_page)
        .count();
    let empty_ratio = empty_pages as f64 / page_count as f64;

    OcrDecision {
        needs_ocr: empty_ratio >= thresholds.empty_ratio,
        empty_ratio,
        page_count,
        empty_pages,
    }
}

/// Classifies documents by reading their pages through a [`PdfTextReader`].
pub struct Classifier {
    reader: Box<dyn PdfTextReader>,
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(reader: Box<dyn PdfTextReader>, thresholds: Thresholds) -> Self {
        Self { reader, thresholds }
    }

    /// Measure the text length of every page of a document.
    pub fn samples(&self, path: &Path) -> Result<Vec<PageTextSample>, ReadError> {
        let texts = self.reader.page_texts(path)?;
        Ok(texts
            .iter()
            .enumerate()
            .map(|(page, text)| PageTextSample::from_text(page, text))
            .collect())
    }

    /// Read a document and decide whether it needs OCR.
    pub fn decide(&self, path: &Path) -> Result<OcrDecision, ReadError> {
        let samples = self.samples(path)?;
        let chars: Vec<usize> = samples.iter().map(|s| s.chars).collect();
        let decision = classify(&chars, &self.thresholds);

        tracing::debug!(
            "{}: {}/{} empty pages (ratio {:.2}), needs OCR: {}",
            path.display(),
            decision.empty_pages,
            decision.page_count,
            decision.empty_ratio,
            decision.needs_ocr
        );

        Ok(decision)
    }
}

//! OCR engines that add a searchable text layer to a PDF.
//!
//! The engine is a black box taking an input PDF, an output path and a
//! Tesseract language code. `ocrmypdf` is the default (and only bundled)
//! implementation; tests substitute their own [`OcrEngine`].

mod backend;
mod ocrmypdf;

pub use backend::{validate_language, OcrEngine, OcrError};
pub use ocrmypdf::{OcrMyPdfConfig, OcrMyPdfEngine};

//! pdf-ocr - find scanned PDFs and give them a searchable text layer.
//!
//! The pipeline walks a file or directory tree for PDFs, measures how much
//! embedded text each page carries, and hands documents that are mostly
//! image-only to an external OCR engine which writes a searchable copy
//! beside the original.
//!
//! The PDF text reader and the OCR engine are traits so the decision logic
//! can run against fakes; the default implementations shell out to Poppler
//! and `ocrmypdf`.

pub mod analysis;
pub mod config;
pub mod ocr;
pub mod pdf;
pub mod scanner;
pub mod services;
pub mod utils;

pub use analysis::{classify, Classifier, OcrDecision, PageTextSample, Thresholds};
pub use config::{Config, ConfigError};
pub use ocr::{OcrEngine, OcrError, OcrMyPdfEngine};
pub use pdf::{PdfTextReader, PopplerReader, ReadError};
pub use scanner::{scan, ScanError};
pub use services::{
    analyze_paths, ocr_file, output_path, DirectoryAnalysis, ProcessOptions, ProcessResult,
    Processor, RunEvent, RunReport, RunSummary, Runner, SkipReason,
};

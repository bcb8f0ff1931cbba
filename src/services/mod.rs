//! Service layer for pdf-ocr business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or called directly as a library.

pub mod analyze;
pub mod processor;
pub mod runner;

pub use analyze::{analyze_paths, DirectoryAnalysis};
pub use processor::{
    is_generated_output, ocr_file, output_path, ProcessOptions, ProcessResult, Processor,
    SkipReason, DEFAULT_SUFFIX,
};
pub use runner::{RunEvent, RunReport, RunSummary, Runner};

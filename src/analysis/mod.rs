//! Text-density analysis: deciding which PDFs need OCR.

mod density;

pub use density::{
    classify, Classifier, OcrDecision, PageTextSample, Thresholds, DEFAULT_EMPTY_RATIO,
    DEFAULT_MIN_CHARS_PER_PAGE,
};

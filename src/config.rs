//! Configuration management for pdf-ocr using the prefer crate.
//!
//! Settings are layered: built-in defaults, then a config file (explicit
//! path or discovered by `prefer`), then `PDF_OCR_*` environment variables.
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{Thresholds, DEFAULT_EMPTY_RATIO, DEFAULT_MIN_CHARS_PER_PAGE};
use crate::ocr::{validate_language, OcrMyPdfConfig};
use crate::pdf::PopplerConfig;
use crate::services::{ProcessOptions, DEFAULT_SUFFIX};

/// Name used for config file discovery (`pdf-ocr.toml`, `pdf-ocr.yaml`, ...).
pub const CONFIG_NAME: &str = "pdf-ocr";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// OCR engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Path to the ocrmypdf executable.
    pub ocrmypdf_path: String,
    /// Straighten skewed pages before OCR.
    pub deskew: bool,
    /// Leave pages that already carry text untouched.
    pub skip_text: bool,
    /// Parallel page workers inside ocrmypdf.
    pub jobs: Option<usize>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        let engine = OcrMyPdfConfig::default();
        Self {
            ocrmypdf_path: engine.binary,
            deskew: engine.deskew,
            skip_text: engine.skip_text,
            jobs: engine.jobs,
        }
    }
}

impl OcrSettings {
    pub fn engine_config(&self) -> OcrMyPdfConfig {
        OcrMyPdfConfig {
            binary: self.ocrmypdf_path.clone(),
            skip_text: self.skip_text,
            deskew: self.deskew,
            jobs: self.jobs,
        }
    }
}

/// PDF text reader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    pub pdfinfo_path: String,
    pub pdftotext_path: String,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        let poppler = PopplerConfig::default();
        Self {
            pdfinfo_path: poppler.pdfinfo_path,
            pdftotext_path: poppler.pdftotext_path,
        }
    }
}

impl ReaderSettings {
    pub fn poppler_config(&self) -> PopplerConfig {
        PopplerConfig {
            pdfinfo_path: self.pdfinfo_path.clone(),
            pdftotext_path: self.pdftotext_path.clone(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suffix inserted before the output file's extension.
    pub suffix: String,
    /// Tesseract language code(s), e.g. `eng` or `eng+fra`.
    pub language: String,
    /// Fraction of pages that must be empty to trigger OCR.
    pub empty_ratio: f64,
    /// Characters below which a page is considered empty.
    pub min_chars_per_page: usize,
    /// Analyze only, never write files.
    pub dry_run: bool,
    /// Reprocess even when outputs exist or OCR is not needed.
    pub force: bool,
    pub ocr: OcrSettings,
    pub reader: ReaderSettings,

    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            language: "eng".to_string(),
            empty_ratio: DEFAULT_EMPTY_RATIO,
            min_chars_per_page: DEFAULT_MIN_CHARS_PER_PAGE,
            dry_run: false,
            force: false,
            ocr: OcrSettings::default(),
            reader: ReaderSettings::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no config file is found or it is broken.
    pub async fn load() -> Self {
        let config = match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("{}, using defaults", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load configuration from an explicit path, then apply env overrides.
    pub async fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
        Ok(Self::load_from_path(Path::new(&expanded))
            .await?
            .with_env_overrides())
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML and JSON based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config file contents, choosing the format by extension.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "json" => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string())),
            _ => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
        }
    }

    /// Apply `PDF_OCR_*` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(suffix) = lookup("PDF_OCR_SUFFIX") {
            self.suffix = suffix;
        }
        if let Some(language) = lookup("PDF_OCR_LANGUAGE") {
            self.language = language;
        }
        if let Some(ratio) = lookup("PDF_OCR_EMPTY_RATIO") {
            match ratio.trim().parse() {
                Ok(ratio) => self.empty_ratio = ratio,
                Err(_) => tracing::warn!("Ignoring invalid PDF_OCR_EMPTY_RATIO: {}", ratio),
            }
        }
        self
    }

    /// Reject settings that would produce wrong paths or unsafe commands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "suffix must not be empty (output would overwrite the source)".to_string(),
            ));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "suffix must not contain path separators: {}",
                self.suffix
            )));
        }
        if !(0.0..=1.0).contains(&self.empty_ratio) {
            return Err(ConfigError::Invalid(format!(
                "empty_ratio must be between 0 and 1, got {}",
                self.empty_ratio
            )));
        }
        validate_language(&self.language).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_chars_per_page: self.min_chars_per_page,
            empty_ratio: self.empty_ratio,
        }
    }

    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            suffix: self.suffix.clone(),
            language: self.language.clone(),
            force: self.force,
            dry_run: self.dry_run,
        }
    }
}

//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod check;
mod process;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use pdf_ocr::Config;

#[derive(Parser)]
#[command(name = "pdf-ocr")]
#[command(about = "Scan a directory for PDFs and add OCR to those that need it.")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  pdf-ocr ~/Documents/Scanned
  pdf-ocr /path/to/pdfs --suffix \"_searchable\"
  pdf-ocr ./documents --dry-run
  pdf-ocr ./documents --force
  pdf-ocr analyze ./documents
  pdf-ocr check")]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// PDF file or directory to scan (recursive)
    #[arg(required = true)]
    path: Option<PathBuf>,

    #[command(flatten)]
    scan: ScanArgs,

    /// Reprocess PDFs even if output already exists or OCR is not needed
    #[arg(long)]
    force: bool,

    /// Analyze only, don't process any files
    #[arg(long)]
    dry_run: bool,

    /// Tesseract language code(s), e.g. 'eng' or 'eng+fra' [default: eng]
    #[arg(short, long)]
    language: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that scans for PDFs.
#[derive(Args, Debug, Clone, Default)]
struct ScanArgs {
    /// Suffix for output files [default: _ocr]
    #[arg(long)]
    suffix: Option<String>,

    /// Fraction of pages that must be empty to trigger OCR [default: 0.5]
    #[arg(long)]
    empty_ratio: Option<f64>,
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ref suffix) = self.suffix {
            config.suffix = suffix.clone();
        }
        if let Some(ratio) = self.empty_ratio {
            config.empty_ratio = ratio;
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Classify PDFs without processing: list which need OCR and which already have text
    Analyze {
        /// PDF file or directory to scan (recursive)
        path: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the external tools (Poppler, ocrmypdf) are installed
    Check,
}

pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_explicit(path).await?,
        None => Config::load().await,
    };

    match cli.command {
        Some(Commands::Check) => Ok(check::cmd_check(&config)),
        Some(Commands::Analyze { path, scan, json }) => {
            scan.apply(&mut config);
            config.validate()?;
            analyze::cmd_analyze(config, path, json).await
        }
        None => {
            let Some(path) = cli.path else {
                anyhow::bail!("A PDF file or directory to scan is required");
            };
            cli.scan.apply(&mut config);
            if let Some(language) = cli.language {
                config.language = language;
            }
            config.force |= cli.force;
            config.dry_run |= cli.dry_run;
            config.validate()?;
            process::cmd_process(config, path, cli.json).await
        }
    }
}

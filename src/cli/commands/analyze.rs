//! Document analysis command (classification only, nothing is written).

use std::path::PathBuf;
use std::process::ExitCode;

use console::style;

use pdf_ocr::{analyze_paths, Classifier, Config, DirectoryAnalysis, PopplerReader};

use crate::cli::progress::{file_spinner, truncate};

/// List which PDFs under `root` need OCR and which already have text.
pub async fn cmd_analyze(config: Config, root: PathBuf, json: bool) -> anyhow::Result<ExitCode> {
    let classifier = Classifier::new(
        Box::new(PopplerReader::with_config(config.reader.poppler_config())),
        config.thresholds(),
    );
    let suffix = config.suffix.clone();

    let analysis = tokio::task::spawn_blocking(move || {
        let progress = (!json).then(|| file_spinner("Analyzing"));
        let result = analyze_paths(&root, &classifier, &suffix, |path| {
            if let Some(ref progress) = progress {
                progress.inc(1);
                progress.set_message(truncate(&path.display().to_string(), 60));
            }
        });
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }
        result
    })
    .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }

    Ok(if analysis.unreadable.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_analysis(analysis: &DirectoryAnalysis) {
    if analysis.total() == 0 {
        println!("No PDF files found.");
        return;
    }

    println!("\n{}", style("Analysis complete:").bold());
    println!("  - Already have OCR: {}", analysis.has_ocr.len());
    println!("  - Need OCR:         {}", analysis.needs_ocr.len());
    if !analysis.unreadable.is_empty() {
        println!("  - Unreadable:       {}", analysis.unreadable.len());
    }

    if !analysis.needs_ocr.is_empty() {
        println!("\n{}", style("Need OCR:").cyan());
        for path in &analysis.needs_ocr {
            println!("  {}", path.display());
        }
    }

    if !analysis.unreadable.is_empty() {
        println!("\n{}", style("Unreadable:").red());
        for (path, error) in &analysis.unreadable {
            println!("  {}", path.display());
            println!("    Error: {}", style(error).dim());
        }
    }
}

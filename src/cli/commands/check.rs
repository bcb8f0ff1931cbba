//! External tool availability check.

use std::process::ExitCode;

use console::style;

use pdf_ocr::utils::check_binary;
use pdf_ocr::{Config, OcrEngine, OcrMyPdfEngine};

/// Report which of the external tools are installed.
pub fn cmd_check(config: &Config) -> ExitCode {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    let tools = [
        ("pdfinfo", config.reader.pdfinfo_path.as_str(), "poppler-utils"),
        ("pdftotext", config.reader.pdftotext_path.as_str(), "poppler-utils"),
        ("ocrmypdf", config.ocr.ocrmypdf_path.as_str(), "ocrmypdf"),
    ];

    let mut all_found = true;
    for (name, binary, package) in tools {
        match check_binary(binary) {
            Some(path) => println!(
                "  {:<15} {} {}",
                name,
                style("✓ found").green(),
                style(path.display()).dim()
            ),
            None => {
                all_found = false;
                println!(
                    "  {:<15} {} {}",
                    name,
                    style("✗ not found").red(),
                    style(format!("(install {})", package)).dim()
                );
            }
        }
    }

    let engine = OcrMyPdfEngine::with_config(config.ocr.engine_config());
    println!("\n{}", style("OCR Engine:").cyan());
    println!("  {} {}", style("→").green(), engine.availability_hint());
    println!("  Language: {}", config.language);

    println!();
    if all_found {
        println!("{} All tools are available", style("✓").green());
        ExitCode::SUCCESS
    } else {
        println!(
            "{} Some tools are missing; PDFs cannot be analyzed or processed until they are installed",
            style("!").yellow()
        );
        ExitCode::FAILURE
    }
}

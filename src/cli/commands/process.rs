//! Default command: scan, classify and OCR.

use std::path::PathBuf;
use std::process::ExitCode;

use console::style;
use tokio::sync::mpsc;

use pdf_ocr::{
    Classifier, Config, OcrEngine, OcrMyPdfEngine, PdfTextReader, PopplerReader, Processor,
    RunEvent, RunReport, Runner, SkipReason,
};

use crate::cli::progress::{file_spinner, status_line, truncate};

/// Run the full pipeline over `root` and print the report.
pub async fn cmd_process(config: Config, root: PathBuf, json: bool) -> anyhow::Result<ExitCode> {
    let reader = PopplerReader::with_config(config.reader.poppler_config());
    let engine = OcrMyPdfEngine::with_config(config.ocr.engine_config());

    if !reader.is_available() {
        eprintln!(
            "{} pdfinfo/pdftotext not found; every PDF will fail to read. Install poppler-utils.",
            style("!").yellow()
        );
    }
    if !config.dry_run && !engine.is_available() {
        eprintln!("{} {}", style("!").yellow(), engine.availability_hint());
    }

    let runner = Runner::new(
        Classifier::new(Box::new(reader), config.thresholds()),
        Processor::new(Box::new(engine), config.process_options()),
    );

    if !json {
        println!("Scanning: {}", root.display());
        println!();
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let run_root = root.clone();
    let worker = tokio::task::spawn_blocking(move || runner.run(&run_root, &event_tx));

    let progress = (!json).then(|| file_spinner("Processing"));
    while let Some(event) = event_rx.recv().await {
        let Some(ref progress) = progress else {
            continue;
        };
        match event {
            RunEvent::DocumentStarted { path, .. } => {
                progress.set_message(truncate(&path.display().to_string(), 60));
            }
            RunEvent::DocumentFinished { result } => {
                progress.inc(1);
                progress.println(status_line(&result));
            }
            RunEvent::ScanStarted { .. }
            | RunEvent::OutputIgnored { .. }
            | RunEvent::RunComplete { .. } => {}
        }
    }
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let report = worker.await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &config);
    }

    Ok(if report.summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &RunReport, config: &Config) {
    let summary = &report.summary;

    if summary.scanned == 0 {
        println!("No PDF files found.");
        return;
    }

    let unreadable = report.results.iter().filter(|r| r.decision.is_none()).count();

    println!("\n{}", style("Analysis complete:").bold());
    println!("  - Already have OCR: {}", report.with_text_layer());
    println!("  - Need OCR:         {}", summary.needs_ocr);
    if unreadable > 0 {
        println!("  - Unreadable:       {}", unreadable);
    }

    if config.dry_run {
        let pending: Vec<_> = report.pending_ocr().collect();
        if pending.is_empty() {
            println!("\nNo PDFs need OCR processing.");
        } else {
            println!("\n{} Files that would be processed:", style("[DRY RUN]").yellow());
            for result in pending {
                let exists = if result.output_existed {
                    " (output exists)"
                } else {
                    ""
                };
                println!("  {}{}", result.input_path.display(), exists);
                println!("    -> {}", result.output_path.display());
            }
        }
    } else {
        println!("\n{}", style("Complete!").bold());
        println!("  - Processed: {}", summary.processed);
        println!(
            "  - Skipped (already existed): {}",
            report.skipped_for(SkipReason::OutputExists).count()
        );
        println!(
            "  - Skipped (no OCR needed):   {}",
            report.skipped_for(SkipReason::NotNeeded).count()
        );
        println!("  - Failed: {}", summary.failed);
    }

    if summary.has_failures() {
        println!("\n{}", style("Failed files:").red());
        for result in report.failures() {
            println!("  {}", result.input_path.display());
            if let Some(ref error) = result.error {
                println!("    Error: {}", error);
            }
        }
    }
}

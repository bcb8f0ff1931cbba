//! Progress display and per-file status lines.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_ocr::{ProcessResult, SkipReason};

/// Spinner counting files as they are handled (the total is unknown while scanning).
pub fn file_spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix} [{pos} file(s)] {wide_msg:.dim}")
            .unwrap(),
    );
    progress.set_prefix(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

/// Shorten a path for the spinner line, keeping the end.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_chars.saturating_sub(1)).collect();
        format!("…{}", tail)
    }
}

/// One line describing what happened to a document.
pub fn status_line(result: &ProcessResult) -> String {
    let input = result.input_path.display();
    let output = result.output_path.display();

    if let Some(ref error) = result.error {
        return format!("  {} {}: {}", style("✗").red(), input, style(error).red());
    }

    match result.skipped {
        None => format!("  {} {} -> {}", style("✓").green(), input, output),
        Some(SkipReason::DryRun) => {
            format!("  {} {} -> {} (dry run)", style("○").yellow(), input, output)
        }
        Some(reason) => format!("  {} {} ({})", style("-").dim(), input, style(reason).dim()),
    }
}

//! End-to-end pipeline tests with fake PDF reader and OCR engine.
//!
//! Fake PDFs are text files: a `%PDF` header line followed by one
//! `page:<text>` line per page. Files without the header are unreadable.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use tokio::sync::mpsc;

use pdf_ocr::{
    analyze_paths, Classifier, OcrEngine, OcrError, PdfTextReader, ProcessOptions, Processor,
    ReadError, RunEvent, RunReport, RunSummary, Runner, ScanError, SkipReason, Thresholds,
};

struct FakeReader;

impl PdfTextReader for FakeReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ReadError> {
        let contents = fs::read_to_string(path)?;
        if !contents.starts_with("%PDF") {
            return Err(ReadError::UnreadablePdf {
                path: path.to_path_buf(),
                reason: "Couldn't find trailer dictionary".to_string(),
            });
        }
        Ok(contents
            .lines()
            .filter_map(|line| line.strip_prefix("page:"))
            .map(str::to_string)
            .collect())
    }
}

/// Copies the input to the output; fails for inputs named `broken*`.
struct FakeEngine {
    calls: Arc<AtomicUsize>,
}

impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "fake engine".to_string()
    }

    fn ocr(&self, input: &Path, output: &Path, language: &str) -> Result<(), OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = input.file_name().unwrap().to_string_lossy();
        if name.starts_with("broken") {
            return Err(OcrError::OcrFailed("ocrmypdf: InputFileError".to_string()));
        }
        let mut bytes = fs::read(input)?;
        bytes.extend_from_slice(format!("%ocr lang={}\n", language).as_bytes());
        fs::write(output, bytes)?;
        Ok(())
    }
}

const TEXT: &str = "This page has a real text layer on it.";

fn write_pdf(path: &Path, pages: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut contents = String::from("%PDF-1.7\n");
    for page in pages {
        contents.push_str("page:");
        contents.push_str(page);
        contents.push('\n');
    }
    fs::write(path, contents).unwrap();
}

/// `a.pdf` has text on every page; `b.pdf` has 4 of 5 pages empty.
fn scenario_dir() -> TempDir {
    let dir = tempdir().unwrap();
    write_pdf(&dir.path().join("a.pdf"), &[TEXT, TEXT, TEXT]);
    write_pdf(&dir.path().join("b.pdf"), &["", "  ", "", "short", TEXT]);
    dir
}

fn build_runner(options: ProcessOptions) -> (Runner, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = Runner::new(
        Classifier::new(Box::new(FakeReader), Thresholds::default()),
        Processor::new(
            Box::new(FakeEngine {
                calls: calls.clone(),
            }),
            options,
        ),
    );
    (runner, calls)
}

fn run(runner: &Runner, root: &Path) -> RunReport {
    let (tx, _rx) = mpsc::unbounded_channel();
    runner.run(root, &tx).unwrap()
}

fn result_for<'a>(report: &'a RunReport, name: &str) -> &'a pdf_ocr::ProcessResult {
    report
        .results
        .iter()
        .find(|r| r.input_path.file_name().unwrap() == name)
        .unwrap_or_else(|| panic!("no result for {}", name))
}

/// Every file under `root` with its contents.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                files.insert(path.clone(), fs::read(&path).unwrap());
            }
        }
    }
    files
}

#[test]
fn test_scenario_one_scanned_one_text() {
    let dir = scenario_dir();
    let (runner, calls) = build_runner(ProcessOptions::default());

    let report = run(&runner, dir.path());

    assert_eq!(
        report.summary,
        RunSummary {
            scanned: 2,
            needs_ocr: 1,
            processed: 1,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let a = result_for(&report, "a.pdf");
    assert_eq!(a.skipped, Some(SkipReason::NotNeeded));

    let b = result_for(&report, "b.pdf");
    assert!(b.is_processed());
    assert_eq!(b.output_path, dir.path().join("b_ocr.pdf"));
    assert!((b.decision.unwrap().empty_ratio - 0.8).abs() < 1e-9);

    assert!(dir.path().join("b_ocr.pdf").exists());
    assert!(!dir.path().join("a_ocr.pdf").exists());
}

#[test]
fn test_second_run_skips_existing_outputs() {
    let dir = scenario_dir();
    let (runner, calls) = build_runner(ProcessOptions::default());

    let first = run(&runner, dir.path());
    let output_bytes = fs::read(dir.path().join("b_ocr.pdf")).unwrap();
    let second = run(&runner, dir.path());

    assert_eq!(second.summary.scanned, first.summary.scanned);
    assert_eq!(second.summary.needs_ocr, first.summary.needs_ocr);
    assert_eq!(second.summary.failed, 0);
    assert_eq!(second.summary.processed, 0);
    assert_eq!(second.summary.skipped, 2);
    assert_eq!(
        result_for(&second, "b.pdf").skipped,
        Some(SkipReason::OutputExists)
    );
    assert_eq!(
        result_for(&second, "a.pdf").skipped,
        Some(SkipReason::NotNeeded)
    );

    // The engine ran once in total and the output was not touched.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(fs::read(dir.path().join("b_ocr.pdf")).unwrap(), output_bytes);
}

#[test]
fn test_dry_run_leaves_filesystem_untouched() {
    let dir = scenario_dir();
    write_pdf(&dir.path().join("nested/c.pdf"), &["", ""]);
    fs::write(dir.path().join("nested/garbage.pdf"), b"not a pdf").unwrap();
    let before = snapshot(dir.path());

    let (runner, calls) = build_runner(ProcessOptions {
        dry_run: true,
        ..ProcessOptions::default()
    });
    let report = run(&runner, dir.path());

    assert_eq!(snapshot(dir.path()), before);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.summary.scanned, 4);
    assert_eq!(report.summary.needs_ocr, 2);
    assert_eq!(report.summary.processed, 0);
    assert_eq!(report.summary.failed, 1);

    let b = result_for(&report, "b.pdf");
    assert_eq!(b.skipped, Some(SkipReason::DryRun));
    assert!(b.needs_ocr());
    assert_eq!(b.output_path, dir.path().join("b_ocr.pdf"));
    assert_eq!(report.skipped_for(SkipReason::DryRun).count(), 2);
}

#[test]
fn test_dry_run_lists_documents_with_existing_outputs() {
    let dir = scenario_dir();
    write_pdf(&dir.path().join("c.pdf"), &["", ""]);
    fs::write(dir.path().join("b_ocr.pdf"), b"earlier output").unwrap();

    let (runner, calls) = build_runner(ProcessOptions {
        dry_run: true,
        ..ProcessOptions::default()
    });
    let report = run(&runner, dir.path());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let mut pending: Vec<_> = report
        .pending_ocr()
        .map(|r| (r.input_path.clone(), r.output_existed))
        .collect();
    pending.sort();
    assert_eq!(
        pending,
        vec![
            (dir.path().join("b.pdf"), true),
            (dir.path().join("c.pdf"), false),
        ]
    );
}

#[test]
fn test_force_reprocesses_everything() {
    let dir = scenario_dir();
    let (runner, _) = build_runner(ProcessOptions::default());
    run(&runner, dir.path());

    let (forced, calls) = build_runner(ProcessOptions {
        force: true,
        ..ProcessOptions::default()
    });
    let report = run(&forced, dir.path());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.summary.skipped, 0);
    assert!(result_for(&report, "b.pdf").output_existed);
    assert!(dir.path().join("a_ocr.pdf").exists());
}

#[test]
fn test_per_file_failures_do_not_stop_the_run() {
    let dir = scenario_dir();
    fs::write(dir.path().join("corrupt.pdf"), b"\x00\x01garbage").unwrap();
    write_pdf(&dir.path().join("broken_scan.pdf"), &["", ""]);

    let (runner, _) = build_runner(ProcessOptions::default());
    let report = run(&runner, dir.path());

    assert_eq!(report.summary.scanned, 4);
    assert_eq!(report.summary.processed, 1);
    assert_eq!(report.summary.failed, 2);
    assert!(report.summary.has_failures());

    let corrupt = result_for(&report, "corrupt.pdf");
    assert!(corrupt.is_failed());
    assert!(corrupt.decision.is_none());
    assert!(corrupt.error.as_ref().unwrap().contains("Unreadable PDF"));

    let broken = result_for(&report, "broken_scan.pdf");
    assert!(broken.is_failed());
    assert!(broken.needs_ocr());
    assert!(broken.error.as_ref().unwrap().contains("InputFileError"));
    assert!(!dir.path().join("broken_scan_ocr.pdf").exists());
}

#[test]
fn test_custom_suffix_and_language() {
    let dir = tempdir().unwrap();
    write_pdf(&dir.path().join("report.pdf"), &[""]);

    let (runner, _) = build_runner(ProcessOptions {
        suffix: "_searchable".to_string(),
        language: "eng+fra".to_string(),
        ..ProcessOptions::default()
    });
    let report = run(&runner, dir.path());

    let output = dir.path().join("report_searchable.pdf");
    assert_eq!(result_for(&report, "report.pdf").output_path, output);
    let contents = fs::read_to_string(output).unwrap();
    assert!(contents.ends_with("%ocr lang=eng+fra\n"));
}

#[test]
fn test_empty_suffix_scans_everything_and_writes_nothing() {
    let dir = scenario_dir();
    let before = snapshot(dir.path());
    let (runner, calls) = build_runner(ProcessOptions {
        suffix: String::new(),
        force: true,
        ..ProcessOptions::default()
    });

    let report = run(&runner, dir.path());

    assert_eq!(report.summary.scanned, 2);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn test_zero_page_document_needs_ocr() {
    let dir = tempdir().unwrap();
    write_pdf(&dir.path().join("blank.pdf"), &[]);

    let (runner, calls) = build_runner(ProcessOptions::default());
    let report = run(&runner, dir.path());

    let blank = result_for(&report, "blank.pdf");
    assert!(blank.needs_ocr());
    assert_eq!(blank.decision.unwrap().page_count, 0);
    assert!(blank.is_processed());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_single_file_root() {
    let dir = scenario_dir();
    let (runner, _) = build_runner(ProcessOptions::default());

    let report = run(&runner, &dir.path().join("b.pdf"));

    assert_eq!(report.summary.scanned, 1);
    assert_eq!(report.summary.processed, 1);
    assert!(!dir.path().join("a_ocr.pdf").exists());
}

#[test]
fn test_file_root_named_like_an_output_is_handled() {
    let dir = scenario_dir();
    write_pdf(&dir.path().join("b_ocr.pdf"), &[TEXT, TEXT]);
    let root = dir.path().join("b_ocr.pdf");
    let (runner, calls) = build_runner(ProcessOptions::default());

    let report = run(&runner, &root);

    assert_eq!(report.summary.scanned, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.results[0].input_path, root);
    assert_eq!(report.results[0].skipped, Some(SkipReason::NotNeeded));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let classifier = Classifier::new(Box::new(FakeReader), Thresholds::default());
    let analysis = analyze_paths(&root, &classifier, "_ocr", |_| {}).unwrap();
    assert_eq!(analysis.has_ocr, vec![root.clone()]);
    assert_eq!(analysis.total(), 1);
}

#[test]
fn test_fatal_root_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    let (runner, _) = build_runner(ProcessOptions::default());
    let (tx, _rx) = mpsc::unbounded_channel();

    let missing = runner.run(&dir.path().join("missing"), &tx).unwrap_err();
    assert!(matches!(missing, ScanError::PathNotFound(_)));

    let not_pdf = runner.run(&dir.path().join("notes.txt"), &tx).unwrap_err();
    assert!(matches!(not_pdf, ScanError::NotAPdf(_)));
}

#[test]
fn test_events_follow_progress() {
    let dir = scenario_dir();
    let (runner, _) = build_runner(ProcessOptions::default());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let report = runner.run(dir.path(), &tx).unwrap();
    drop(tx);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(RunEvent::ScanStarted { .. })));
    let started = events
        .iter()
        .filter(|e| matches!(e, RunEvent::DocumentStarted { .. }))
        .count();
    let finished = events
        .iter()
        .filter(|e| matches!(e, RunEvent::DocumentFinished { .. }))
        .count();
    assert_eq!(started, 2);
    assert_eq!(finished, 2);

    match events.last() {
        Some(RunEvent::RunComplete { summary }) => assert_eq!(*summary, report.summary),
        other => panic!("expected RunComplete, got {:?}", other),
    }
}

#[test]
fn test_outputs_of_earlier_runs_are_ignored() {
    let dir = scenario_dir();
    let (runner, _) = build_runner(ProcessOptions::default());
    run(&runner, dir.path());

    let (tx, mut rx) = mpsc::unbounded_channel();
    runner.run(dir.path(), &tx).unwrap();
    drop(tx);

    let mut ignored = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let RunEvent::OutputIgnored { path } = event {
            ignored.push(path);
        }
    }
    assert_eq!(ignored, vec![dir.path().join("b_ocr.pdf")]);
}

#[test]
fn test_analyze_paths_groups_documents() {
    let dir = scenario_dir();
    fs::write(dir.path().join("corrupt.pdf"), b"junk").unwrap();
    let classifier = Classifier::new(Box::new(FakeReader), Thresholds::default());

    let mut seen = 0;
    let analysis = analyze_paths(dir.path(), &classifier, "_ocr", |_| seen += 1).unwrap();

    assert_eq!(seen, 3);
    assert_eq!(analysis.total(), 3);
    assert_eq!(analysis.needs_ocr, vec![dir.path().join("b.pdf")]);
    assert_eq!(analysis.has_ocr, vec![dir.path().join("a.pdf")]);
    assert_eq!(analysis.unreadable.len(), 1);
    assert_eq!(analysis.unreadable[0].0, dir.path().join("corrupt.pdf"));
}

#[test]
fn test_empty_ratio_threshold_changes_decision() {
    let dir = tempdir().unwrap();
    write_pdf(&dir.path().join("mixed.pdf"), &["", TEXT, TEXT, TEXT]);

    let eager = Classifier::new(
        Box::new(FakeReader),
        Thresholds {
            empty_ratio: 0.25,
            ..Thresholds::default()
        },
    );
    let default = Classifier::new(Box::new(FakeReader), Thresholds::default());

    let path = dir.path().join("mixed.pdf");
    assert!(eager.decide(&path).unwrap().needs_ocr);
    assert!(!default.decide(&path).unwrap().needs_ocr);
}

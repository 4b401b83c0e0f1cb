//! Test harness for isolated scan runs.
//!
//! `TestHarness` owns a temporary directory with `input/` and `output/`
//! subdirectories, writes manifests, runs the pipeline against a recording
//! notifier, and reads both result channels back.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use keyaudit::alert::{AlertAggregator, AlertNotifier, AlertPayload};
use keyaudit::error::{NotifyError, ScanError};
use keyaudit::sink::{ResultSink, SinkPaths};
use keyaudit::{ScanPipeline, Summary};

/// Notifier that keeps every payload it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    payloads: Mutex<Vec<AlertPayload>>,
}

impl RecordingNotifier {
    pub fn payloads(&self) -> Vec<AlertPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    fn notify(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

/// One row of the structured results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub timestamp: String,
    pub file_path: String,
    pub status: String,
    pub matched_keywords: String,
    pub error_message: String,
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub keywords_a: Vec<String>,
    pub keywords_b: Vec<String>,
    pub threshold: usize,
    pub flush_on_finish: bool,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    /// Harness with keywords A = ["Company"], B = ["Confidential"] and an
    /// alert threshold of 10.
    pub fn new() -> Self {
        Self::with_keywords(&["Company"], &["Confidential"])
    }

    pub fn with_keywords(a: &[&str], b: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        Self {
            temp_dir,
            input_dir,
            output_dir,
            keywords_a: a.iter().map(|s| s.to_string()).collect(),
            keywords_b: b.iter().map(|s| s.to_string()).collect(),
            threshold: 10,
            flush_on_finish: false,
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create input subdir");
        }
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn write_text_input(&self, filename: &str, content: &str) -> PathBuf {
        self.write_input(filename, content.as_bytes())
    }

    /// Path inside the input directory that is never created.
    pub fn missing_input(&self, filename: &str) -> PathBuf {
        self.input_dir.join(filename)
    }

    /// Writes a manifest listing `paths`, one per line.
    pub fn write_manifest(&self, paths: &[PathBuf]) -> PathBuf {
        let path = self.temp_dir.path().join("manifest.csv");
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create manifest");
        for entry in paths {
            writer
                .write_record([&*entry.to_string_lossy()])
                .expect("Failed to write manifest row");
        }
        writer.flush().expect("Failed to flush manifest");
        path
    }

    pub fn sink_paths(&self) -> SinkPaths {
        SinkPaths::from_base(&self.output_dir.join("scan").to_string_lossy())
    }

    pub fn pipeline(&self) -> ScanPipeline {
        let sink = ResultSink::create(&self.sink_paths()).expect("Failed to create sink");
        let alerts = AlertAggregator::new(self.threshold, self.notifier.clone());
        ScanPipeline::new(
            &self.keywords_a,
            &self.keywords_b,
            Arc::new(sink),
            Arc::new(alerts),
        )
        .with_final_flush(self.flush_on_finish)
    }

    pub fn run(&self, manifest: &Path, workers: usize) -> Result<Summary, ScanError> {
        self.pipeline().run(manifest, workers)
    }

    pub fn run_cancelled(&self, manifest: &Path, workers: usize) -> Result<Summary, ScanError> {
        self.pipeline()
            .with_shutdown(Arc::new(AtomicBool::new(true)))
            .run(manifest, workers)
    }

    /// Header row of the structured results file.
    pub fn result_header(&self) -> Vec<String> {
        let mut reader =
            csv::Reader::from_path(&self.sink_paths().structured).expect("Missing results file");
        reader
            .headers()
            .expect("Missing header")
            .iter()
            .map(String::from)
            .collect()
    }

    pub fn result_rows(&self) -> Vec<ResultRow> {
        let mut reader =
            csv::Reader::from_path(&self.sink_paths().structured).expect("Missing results file");
        reader
            .records()
            .map(|record| {
                let record = record.expect("Malformed result row");
                ResultRow {
                    timestamp: record[0].to_string(),
                    file_path: record[1].to_string(),
                    status: record[2].to_string(),
                    matched_keywords: record[3].to_string(),
                    error_message: record[4].to_string(),
                }
            })
            .collect()
    }

    /// Result row for `path`, panicking if there is not exactly one.
    pub fn row_for(&self, path: &Path) -> ResultRow {
        let wanted = path.to_string_lossy();
        let rows: Vec<ResultRow> = self
            .result_rows()
            .into_iter()
            .filter(|row| row.file_path == wanted)
            .collect();
        assert_eq!(rows.len(), 1, "expected one row for {}", wanted);
        rows.into_iter().next().unwrap()
    }

    pub fn narrative(&self) -> String {
        std::fs::read_to_string(&self.sink_paths().narrative).expect("Missing narrative file")
    }
}

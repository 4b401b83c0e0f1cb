//! Durable recording of scan outcomes.
//!
//! Every outcome goes to two channels under one lock: a CSV row for machines
//! and narrative lines for people. Both are written from the same
//! [`FileOutcome`], so they always agree on status and keywords.

pub mod narrative;
pub mod outcome;
pub mod structured;

pub use narrative::NarrativeWriter;
pub use outcome::{FileOutcome, MemberMatch, OutcomeStatus, TIMESTAMP_FORMAT};
pub use structured::{StructuredWriter, RESULT_HEADER};

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::error::SinkError;

struct Channels {
    structured: StructuredWriter,
    narrative: NarrativeWriter,
}

pub struct ResultSink {
    channels: Mutex<Channels>,
}

/// Output locations derived from a file base such as `logs/scan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkPaths {
    pub narrative: PathBuf,
    pub structured: PathBuf,
}

impl SinkPaths {
    pub fn from_base(file_base: &str) -> Self {
        Self {
            narrative: PathBuf::from(format!("{}.txt", file_base)),
            structured: PathBuf::from(format!("{}_results.csv", file_base)),
        }
    }
}

impl ResultSink {
    /// Creates both output files, truncating existing ones. Failing here is
    /// fatal for the run.
    pub fn create(paths: &SinkPaths) -> Result<Self, SinkError> {
        let narrative = open_output(&paths.narrative)?;
        let structured = open_output(&paths.structured)?;

        Self::from_writers(Box::new(structured), Box::new(narrative))
    }

    pub fn from_writers(
        structured: Box<dyn Write + Send>,
        narrative: Box<dyn Write + Send>,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            channels: Mutex::new(Channels {
                structured: StructuredWriter::new(structured)?,
                narrative: NarrativeWriter::new(narrative),
            }),
        })
    }

    /// Appends one outcome to both channels. Safe to call from any worker.
    ///
    /// The CSV row is the record of truth: once it is written the outcome
    /// counts as recorded, and a narrative failure is only logged.
    pub fn record(&self, outcome: FileOutcome) -> Result<(), SinkError> {
        log_outcome(&outcome);

        let mut channels = self.channels.lock().map_err(|_| SinkError::Poisoned)?;
        channels.structured.write(&outcome)?;
        if let Err(e) = channels.narrative.write(&outcome) {
            warn!(
                "Narrative entry for {} not written: {}",
                outcome.file_path.display(),
                e
            );
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        let mut channels = self.channels.lock().map_err(|_| SinkError::Poisoned)?;
        channels.structured.flush()?;
        channels.narrative.flush()?;
        Ok(())
    }

    /// Writes a free-text line to the narrative channel only.
    pub fn note(&self, message: &str) -> Result<(), SinkError> {
        let mut channels = self.channels.lock().map_err(|_| SinkError::Poisoned)?;
        channels.narrative.note(message)?;
        Ok(())
    }
}

pub(crate) fn open_output(path: &Path) -> Result<File, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SinkError::Create {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    File::create(path).map_err(|e| SinkError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

fn log_outcome(outcome: &FileOutcome) {
    let path = outcome.file_path.display();
    match outcome.status {
        OutcomeStatus::Matched => info!(
            status = %outcome.status,
            "Keywords found in file: {}. Matched keywords: {}",
            path,
            outcome.joined_keywords()
        ),
        OutcomeStatus::NotMatched => info!(status = %outcome.status, "No keywords found in file: {}", path),
        OutcomeStatus::Unreadable => warn!(status = %outcome.status, "Unable to read file: {}", path),
        OutcomeStatus::Error => error!(
            status = %outcome.status,
            "Error processing file {}: {}",
            path,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_sink_paths_from_base() {
        let paths = SinkPaths::from_base("logs/scan");
        assert_eq!(paths.narrative, PathBuf::from("logs/scan.txt"));
        assert_eq!(paths.structured, PathBuf::from("logs/scan_results.csv"));
    }

    #[test]
    fn test_create_makes_parent_dirs_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested/out/run");
        let paths = SinkPaths::from_base(&base.to_string_lossy());

        let sink = ResultSink::create(&paths).unwrap();
        sink.flush().unwrap();

        let csv = read(&paths.structured);
        assert_eq!(
            csv.lines().next().unwrap(),
            "Timestamp,File Path,Status,Matched Keywords,Error Message"
        );
        assert!(paths.narrative.exists());
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let paths = SinkPaths::from_base(&blocker.join("run").to_string_lossy());

        assert!(matches!(
            ResultSink::create(&paths),
            Err(SinkError::Create { .. })
        ));
    }

    #[test]
    fn test_channels_agree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SinkPaths::from_base(&dir.path().join("run").to_string_lossy());
        let sink = ResultSink::create(&paths).unwrap();

        sink.record(FileOutcome::scanned(
            PathBuf::from("/data/a.txt"),
            vec!["alpha".into(), "beta".into()],
            vec![],
        ))
        .unwrap();
        sink.record(FileOutcome::error(PathBuf::from("/data/gone.txt"), "not found"))
            .unwrap();
        sink.flush().unwrap();

        let csv = read(&paths.structured);
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with(",/data/a.txt,Matched,\"alpha, beta\","));
        assert!(rows[1].ends_with(",/data/gone.txt,Error,,not found"));

        let narrative = read(&paths.narrative);
        assert!(narrative.contains(
            "Keywords found in file: /data/a.txt. Matched keywords: alpha, beta"
        ));
        assert!(narrative.contains("[Error] Processed file: /data/gone.txt"));
    }

    /// Accepts nothing; every write fails.
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_narrative_failure_keeps_result_row() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("run_results.csv");
        let structured = File::create(&csv_path).unwrap();
        let sink = ResultSink::from_writers(Box::new(structured), Box::new(BrokenWriter)).unwrap();

        sink.record(FileOutcome::scanned(
            PathBuf::from("/data/a.txt"),
            vec!["alpha".into()],
            vec![],
        ))
        .unwrap();

        let csv = read(&csv_path);
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ends_with(",/data/a.txt,Matched,alpha,"));
    }

    #[test]
    fn test_unwritable_result_channel_rejected() {
        let result = ResultSink::from_writers(Box::new(BrokenWriter), Box::new(std::io::sink()));
        assert!(matches!(
            result,
            Err(SinkError::Csv(_)) | Err(SinkError::Write(_))
        ));
    }

    #[test]
    fn test_concurrent_records_are_not_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SinkPaths::from_base(&dir.path().join("run").to_string_lossy());
        let sink = Arc::new(ResultSink::create(&paths).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let path = PathBuf::from(format!("/data/{}-{}.txt", t, i));
                        sink.record(FileOutcome::scanned(path, vec![], vec![])).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        sink.flush().unwrap();

        let csv = read(&paths.structured);
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 400);
        assert!(rows.iter().all(|r| r.ends_with(",Not Matched,,")));
    }
}

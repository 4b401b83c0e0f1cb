//! Existence audit: for every manifest entry, record whether the path is
//! present on disk. No file is opened or scanned.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{error, info, info_span, warn};

use crate::error::{ScanError, SinkError};
use crate::sink::{open_output, TIMESTAMP_FORMAT};
use crate::worker::{JobHandler, ScanJob, WorkerPool};

use super::manifest::Manifest;
use super::progress::RunProgress;

pub const EXISTENCE_HEADER: [&str; 3] = ["Timestamp", "File Path", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceStatus {
    Exists,
    NotFound,
}

impl ExistenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistenceStatus::Exists => "Exists",
            ExistenceStatus::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for ExistenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ExistenceRecord {
    pub timestamp: DateTime<Local>,
    pub path: PathBuf,
    pub status: ExistenceStatus,
}

/// Stats a path without opening it. A permission or I/O failure while
/// probing the path counts as not found.
pub struct ExistenceChecker;

impl ExistenceChecker {
    pub fn check(path: &Path) -> ExistenceRecord {
        let status = match path.try_exists() {
            Ok(true) => ExistenceStatus::Exists,
            Ok(false) => ExistenceStatus::NotFound,
            Err(e) => {
                warn!("Could not check {}: {}", path.display(), e);
                ExistenceStatus::NotFound
            }
        };
        ExistenceRecord {
            timestamp: Local::now(),
            path: path.to_path_buf(),
            status,
        }
    }
}

impl JobHandler for ExistenceChecker {
    type Output = ExistenceRecord;

    fn handle(&self, job: &ScanJob) -> ExistenceRecord {
        Self::check(&job.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistenceSummary {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl ExistenceSummary {
    fn add(&mut self, record: &ExistenceRecord) {
        self.total += 1;
        match record.status {
            ExistenceStatus::Exists => self.found += 1,
            ExistenceStatus::NotFound => self.missing += 1,
        }
    }
}

impl fmt::Display for ExistenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} paths checked in {:.1}s: {} exist, {} not found",
            self.total,
            self.elapsed.as_secs_f64(),
            self.found,
            self.missing
        )?;
        if self.cancelled {
            write!(f, " (cancelled, {} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

/// Runs the existence audit over a manifest on the worker pool and writes
/// one CSV row per checked path, in completion order.
pub struct ExistenceCheck {
    shutdown: Arc<AtomicBool>,
    show_progress: bool,
}

impl Default for ExistenceCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ExistenceCheck {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            show_progress: false,
        }
    }

    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn run(
        &self,
        manifest_path: &Path,
        output: &Path,
        concurrency: usize,
    ) -> Result<ExistenceSummary, ScanError> {
        let _span = info_span!("existence_run", workers = concurrency).entered();

        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }

        let manifest = Manifest::read(manifest_path)?;
        self.run_manifest(&manifest, output, concurrency)
    }

    pub fn run_manifest(
        &self,
        manifest: &Manifest,
        output: &Path,
        concurrency: usize,
    ) -> Result<ExistenceSummary, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }

        let started = Instant::now();
        let mut writer = csv::Writer::from_writer(open_output(output)?);
        writer.write_record(EXISTENCE_HEADER).map_err(SinkError::from)?;
        writer.flush().map_err(SinkError::from)?;

        if manifest.is_empty() {
            warn!("No file paths to check");
            return Ok(ExistenceSummary {
                elapsed: started.elapsed(),
                ..Default::default()
            });
        }

        info!(
            "Checking {} paths with {} workers, writing {}",
            manifest.len(),
            concurrency,
            output.display()
        );

        let pool = WorkerPool::new(
            Arc::new(ExistenceChecker),
            concurrency,
            Arc::clone(&self.shutdown),
        )?;
        let mut progress = RunProgress::new(manifest.len(), "checking", self.show_progress);
        let mut summary = ExistenceSummary::default();
        let mut failure = None;

        let mut write = |record: ExistenceRecord,
                         summary: &mut ExistenceSummary,
                         failure: &mut Option<SinkError>| {
            summary.add(&record);
            progress.advance();
            if failure.is_some() {
                return;
            }
            if let Err(e) = write_row(&mut writer, &record) {
                *failure = Some(e);
            }
        };

        for (index, path) in manifest.paths().iter().enumerate() {
            if pool.is_shutdown() || failure.is_some() {
                break;
            }
            if pool.submit(ScanJob::new(index, path.clone())).is_err() {
                break;
            }
            while let Some(record) = pool.try_recv_result() {
                write(record, &mut summary, &mut failure);
            }
            if failure.is_some() {
                pool.shutdown();
            }
        }

        let results = pool.wait();
        for record in results.try_iter() {
            write(record, &mut summary, &mut failure);
        }

        if let Some(e) = failure {
            progress.finish(true);
            error!("Existence check aborted: {}", e);
            return Err(e.into());
        }

        summary.cancelled = self.shutdown.load(Ordering::Relaxed);
        summary.skipped = manifest.len() - summary.total;
        summary.elapsed = started.elapsed();
        progress.finish(summary.cancelled);

        if summary.cancelled {
            warn!("Existence check cancelled: {}", summary);
        } else {
            info!("Existence check complete: {}", summary);
        }
        Ok(summary)
    }
}

fn write_row<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    record: &ExistenceRecord,
) -> Result<(), SinkError> {
    let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
    writer.write_record([
        timestamp.as_str(),
        &*record.path.to_string_lossy(),
        record.status.as_str(),
    ])?;
    writer.flush()?;
    Ok(())
}

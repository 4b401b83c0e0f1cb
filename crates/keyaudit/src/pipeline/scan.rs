use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::alert::AlertAggregator;
use crate::error::ScanError;
use crate::extractor::ExtractorRegistry;
use crate::matcher::KeywordSet;
use crate::sink::ResultSink;
use crate::worker::{ScanJob, WorkerPool};

use super::manifest::Manifest;
use super::progress::RunProgress;
use super::runner::FileScanner;
use super::summary::Summary;

/// Orchestrates one run: manifest in, one recorded outcome per entry out.
pub struct ScanPipeline {
    keywords: KeywordSet,
    sink: Arc<ResultSink>,
    alerts: Arc<AlertAggregator>,
    shutdown: Arc<AtomicBool>,
    flush_on_finish: bool,
    show_progress: bool,
}

impl ScanPipeline {
    pub fn new(
        keywords_a: &[String],
        keywords_b: &[String],
        sink: Arc<ResultSink>,
        alerts: Arc<AlertAggregator>,
    ) -> Self {
        Self {
            keywords: KeywordSet::new(keywords_a, keywords_b),
            sink,
            alerts,
            shutdown: Arc::new(AtomicBool::new(false)),
            flush_on_finish: false,
            show_progress: false,
        }
    }

    /// Shares a cancellation flag. Once set, no further entries are
    /// dispatched and the run returns a partial summary.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Send errors still buffered below the threshold when the run ends.
    pub fn with_final_flush(mut self, enabled: bool) -> Self {
        self.flush_on_finish = enabled;
        self
    }

    /// Draw a progress bar on stderr while the run is in flight.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn run(&self, manifest_path: &Path, concurrency: usize) -> Result<Summary, ScanError> {
        let _span = info_span!("scan_run", workers = concurrency).entered();

        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }

        let manifest = Manifest::read(manifest_path)?;
        self.run_manifest(&manifest, manifest_path, concurrency)
    }

    pub fn run_manifest(
        &self,
        manifest: &Manifest,
        source: &Path,
        concurrency: usize,
    ) -> Result<Summary, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }

        let started = Instant::now();

        if manifest.is_empty() {
            warn!("No file paths found in manifest: {}", source.display());
            self.sink
                .note(&format!("No input: manifest {} is empty", source.display()))?;
            return Ok(Summary {
                elapsed: started.elapsed(),
                ..Default::default()
            });
        }

        if self.keywords.is_empty() {
            warn!("Keyword set is empty; no file can match");
        }

        info!(
            "Scanning {} files from {} with {} workers",
            manifest.len(),
            source.display(),
            concurrency
        );

        let scanner = Arc::new(FileScanner::new(
            ExtractorRegistry::new(),
            self.keywords.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&self.alerts),
        ));
        let pool = WorkerPool::new(scanner, concurrency, Arc::clone(&self.shutdown))?;

        let mut progress = RunProgress::new(manifest.len(), "scanning", self.show_progress);
        let mut summary = Summary::default();
        for (index, path) in manifest.paths().iter().enumerate() {
            if pool.is_shutdown() {
                break;
            }
            if pool.submit(ScanJob::new(index, path.clone())).is_err() {
                break;
            }
            while let Some(report) = pool.try_recv_result() {
                summary.add(&report);
                progress.advance();
            }
        }

        for report in pool.wait().try_iter() {
            summary.add(&report);
            progress.advance();
        }

        summary.cancelled = self.shutdown.load(Ordering::Relaxed);
        progress.finish(summary.cancelled);
        summary.skipped = manifest.len() - summary.total_files;
        summary.elapsed = started.elapsed();

        self.finish(&summary, source)?;
        Ok(summary)
    }

    fn finish(&self, summary: &Summary, source: &Path) -> Result<(), ScanError> {
        if self.flush_on_finish {
            let sent = self.alerts.flush_remaining();
            if sent > 0 {
                info!("Flushed {} residual errors at end of run", sent);
            }
        } else {
            let pending = self.alerts.pending();
            if pending > 0 {
                warn!(
                    "{} errors remain below the alert threshold of {} and were not sent",
                    pending,
                    self.alerts.threshold()
                );
            }
        }

        if summary.cancelled {
            warn!("Scan cancelled: {}", summary);
            self.sink
                .note(&format!("Cancelled processing of manifest: {} ({})", source.display(), summary))?;
        } else {
            info!("Completed processing of manifest: {} ({})", source.display(), summary);
            self.sink
                .note(&format!("Completed processing of manifest: {} ({})", source.display(), summary))?;
        }
        self.sink.flush()?;
        Ok(())
    }
}

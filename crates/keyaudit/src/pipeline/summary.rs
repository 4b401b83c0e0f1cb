use std::fmt;
use std::time::Duration;

use crate::sink::OutcomeStatus;
use crate::worker::FileReport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Outcomes produced. Equals the manifest length unless cancelled.
    pub total_files: usize,
    pub matched_count: usize,
    pub not_matched_count: usize,
    pub unreadable_count: usize,
    pub error_count: usize,
    /// Outcomes the sink failed to persist.
    pub unrecorded_count: usize,
    /// Manifest entries never processed because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl Summary {
    pub fn add(&mut self, report: &FileReport) {
        self.total_files += 1;
        match report.status {
            OutcomeStatus::Matched => self.matched_count += 1,
            OutcomeStatus::NotMatched => self.not_matched_count += 1,
            OutcomeStatus::Unreadable => self.unreadable_count += 1,
            OutcomeStatus::Error => self.error_count += 1,
        }
        if !report.recorded {
            self.unrecorded_count += 1;
        }
    }

    /// True when the manifest held no paths.
    pub fn is_empty_run(&self) -> bool {
        self.total_files == 0 && self.skipped == 0 && !self.cancelled
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files in {:.1}s: {} matched, {} not matched, {} unreadable, {} errors",
            self.total_files,
            self.elapsed.as_secs_f64(),
            self.matched_count,
            self.not_matched_count,
            self.unreadable_count,
            self.error_count
        )?;
        if self.unrecorded_count > 0 {
            write!(f, ", {} not recorded", self.unrecorded_count)?;
        }
        if self.cancelled {
            write!(f, " (cancelled, {} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

use std::path::PathBuf;

use crate::sink::OutcomeStatus;

/// One manifest entry handed to a worker.
#[derive(Debug, Clone)]
pub struct ScanJob {
    /// Position in the manifest, for diagnostics only. Outcomes are recorded
    /// in completion order.
    pub index: usize,
    pub path: PathBuf,
}

impl ScanJob {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }
}

/// Work a pool thread performs for each job. One handler instance is shared
/// by every worker of a pool.
pub trait JobHandler: Send + Sync + 'static {
    type Output: Send + 'static;

    fn handle(&self, job: &ScanJob) -> Self::Output;
}

/// What a worker reports back after a job. The full outcome itself belongs
/// to the result sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub index: usize,
    pub status: OutcomeStatus,
    /// False when the sink failed to persist the outcome.
    pub recorded: bool,
}

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info_span};

use crate::alert::AlertAggregator;
use crate::extractor::{ExtractedContent, ExtractorRegistry};
use crate::matcher::KeywordSet;
use crate::sanitize;
use crate::sink::{FileOutcome, MemberMatch, OutcomeStatus, ResultSink};
use crate::worker::{FileReport, JobHandler, ScanJob};

/// Per-file pipeline: extract, then match, then record. Shared by all
/// workers of a run.
pub struct FileScanner {
    registry: ExtractorRegistry,
    keywords: KeywordSet,
    sink: Arc<ResultSink>,
    alerts: Arc<AlertAggregator>,
}

impl FileScanner {
    pub fn new(
        registry: ExtractorRegistry,
        keywords: KeywordSet,
        sink: Arc<ResultSink>,
        alerts: Arc<AlertAggregator>,
    ) -> Self {
        Self {
            registry,
            keywords,
            sink,
            alerts,
        }
    }

    /// Produces exactly one outcome for `job`, whatever happens inside the
    /// extractor. Errors are recorded and then forwarded to the alert buffer.
    pub fn scan(&self, job: &ScanJob) -> FileReport {
        let path = job.path.as_path();
        let _span = info_span!("scan_file",
            index = job.index,
            file = %sanitize::redact_path(path),
        )
        .entered();

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(path))) {
            Ok(outcome) => outcome,
            Err(payload) => FileOutcome::error(
                path.to_path_buf(),
                format!("extractor panicked: {}", panic_message(payload.as_ref())),
            ),
        };

        let status = outcome.status;
        let alert = (status == OutcomeStatus::Error).then(|| {
            format!(
                "Error processing file {}: {}",
                path.display(),
                outcome.error_message.as_deref().unwrap_or("unknown error")
            )
        });

        let recorded = match self.sink.record(outcome) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to record outcome for {}: {}", path.display(), e);
                false
            }
        };

        if let Some(message) = alert {
            self.alerts.report_error(message);
        }

        FileReport {
            index: job.index,
            status,
            recorded,
        }
    }

    fn evaluate(&self, path: &Path) -> FileOutcome {
        let content = {
            let _step = info_span!("extract").entered();
            match self.registry.extract(path) {
                Ok(Some(content)) => content,
                Ok(None) => {
                    return FileOutcome::unreadable(
                        path.to_path_buf(),
                        "Unable to read file: unsupported file type",
                    )
                }
                Err(e) => return FileOutcome::error(path.to_path_buf(), e.to_string()),
            }
        };

        let _step = info_span!("match").entered();
        let result = self.keywords.match_content(&content);
        let members = self.member_matches(&content);
        debug!(
            "Matched {} of {} keywords",
            result.hits.len(),
            self.keywords.len()
        );

        FileOutcome::scanned(path.to_path_buf(), result.hits, members)
    }

    fn member_matches(&self, content: &ExtractedContent) -> Vec<MemberMatch> {
        let ExtractedContent::Archive(members) = content else {
            return Vec::new();
        };

        members
            .iter()
            .filter_map(|(member, text)| {
                let result = self.keywords.match_text(text);
                result.matched.then(|| MemberMatch {
                    member: member.clone(),
                    hits: result.hits,
                })
            })
            .collect()
    }
}

impl JobHandler for FileScanner {
    type Output = FileReport;

    fn handle(&self, job: &ScanJob) -> FileReport {
        self.scan(job)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

use std::io::Write;

use chrono::Local;

use crate::sink::outcome::{FileOutcome, OutcomeStatus, TIMESTAMP_FORMAT};

/// Human-readable audit trail. Diagnostic only; the CSV rows are the
/// artifact of record.
pub struct NarrativeWriter {
    inner: Box<dyn Write + Send>,
}

impl NarrativeWriter {
    pub fn new(inner: Box<dyn Write + Send>) -> Self {
        Self { inner }
    }

    pub fn write(&mut self, outcome: &FileOutcome) -> std::io::Result<()> {
        let ts = outcome.formatted_timestamp();
        let path = outcome.file_path.display();

        writeln!(self.inner, "{} [{}] Processed file: {}", ts, outcome.status, path)?;
        match outcome.status {
            OutcomeStatus::Matched => {
                writeln!(
                    self.inner,
                    "{} [{}] Keywords found in file: {}. Matched keywords: {}",
                    ts,
                    outcome.status,
                    path,
                    outcome.joined_keywords()
                )?;
                for member in &outcome.members {
                    writeln!(
                        self.inner,
                        "{} [{}] Keywords found in archive member: {}. Matched keywords: {}",
                        ts,
                        outcome.status,
                        member.member,
                        member.hits.join(", ")
                    )?;
                }
            }
            OutcomeStatus::NotMatched => {
                writeln!(self.inner, "{} [{}] No keywords found in file: {}", ts, outcome.status, path)?;
            }
            OutcomeStatus::Unreadable | OutcomeStatus::Error => {
                writeln!(
                    self.inner,
                    "{} [{}] {}",
                    ts,
                    outcome.status,
                    outcome.error_message.as_deref().unwrap_or("no detail")
                )?;
            }
        }
        self.inner.flush()
    }

    pub fn note(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(
            self.inner,
            "{} [Note] {}",
            Local::now().format(TIMESTAMP_FORMAT),
            message
        )?;
        self.inner.flush()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

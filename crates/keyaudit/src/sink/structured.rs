use std::io::Write;

use csv::WriterBuilder;

use crate::error::SinkError;
use crate::sink::outcome::FileOutcome;

pub const RESULT_HEADER: [&str; 5] = [
    "Timestamp",
    "File Path",
    "Status",
    "Matched Keywords",
    "Error Message",
];

/// Machine-readable result rows. Each row is flushed as soon as it is
/// written so a crashed run still leaves every recorded outcome on disk.
pub struct StructuredWriter {
    writer: csv::Writer<Box<dyn Write + Send>>,
}

impl StructuredWriter {
    pub fn new(inner: Box<dyn Write + Send>) -> Result<Self, SinkError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(RESULT_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, outcome: &FileOutcome) -> Result<(), SinkError> {
        let timestamp = outcome.formatted_timestamp();
        let file_path = outcome.file_path.to_string_lossy();
        let keywords = outcome.joined_keywords();
        self.writer.write_record([
            timestamp.as_str(),
            &*file_path,
            outcome.status.as_str(),
            keywords.as_str(),
            outcome.error_message.as_deref().unwrap_or(""),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::ExtractError;
use crate::extractor::{ContentExtractor, ExtractedContent, FileFamily};

/// CSV content: every record on its own line, fields separated by a space.
pub struct TabularExtractor;

impl TabularExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TabularExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for TabularExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            lines.push(record.iter().collect::<Vec<_>>().join(" "));
        }

        Ok(ExtractedContent::Text(lines.join("\n")))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::Tabular)
    }
}

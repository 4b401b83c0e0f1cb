use std::path::Path;

use crate::error::ExtractError;
use crate::extractor::{ContentExtractor, ExtractedContent, FileFamily};

pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for TextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let text = std::fs::read_to_string(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(ExtractedContent::Text(text))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::PlainText)
    }
}

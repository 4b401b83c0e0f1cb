pub mod archive;
pub mod presentation;
pub mod spreadsheet;
pub mod tabular;
pub mod text;
pub mod word;

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::BytesRef;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::sanitize;

/// File-type families recognized by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFamily {
    Spreadsheet,
    Word,
    Presentation,
    PlainText,
    Tabular,
    Archive,
}

impl FileFamily {
    const SUFFIXES: &'static [(&'static str, FileFamily)] = &[
        (".xlsx", FileFamily::Spreadsheet),
        (".xls", FileFamily::Spreadsheet),
        (".xlsb", FileFamily::Spreadsheet),
        (".xlsm", FileFamily::Spreadsheet),
        (".docx", FileFamily::Word),
        (".doc", FileFamily::Word),
        (".pptx", FileFamily::Presentation),
        (".ppt", FileFamily::Presentation),
        (".txt", FileFamily::PlainText),
        (".csv", FileFamily::Tabular),
        (".zip", FileFamily::Archive),
    ];

    /// Exact, case-sensitive suffix match: `report.TXT` is not plain text.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, family)| *family)
    }
}

/// Text pulled out of one file. Archives yield one entry per member that
/// could be read, keyed by its path inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    Text(String),
    Archive(BTreeMap<String, String>),
}

pub trait ContentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError>;
    fn supports(&self, family: FileFamily) -> bool;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Registry for top-level manifest entries, archives included.
    pub fn new() -> Self {
        let mut extractors = Self::document_extractors();
        extractors.push(Box::new(archive::ArchiveExtractor::new(
            Self::without_archives(),
        )));
        Self { extractors }
    }

    /// Registry used for archive members; nested archives are not unpacked.
    pub fn without_archives() -> Self {
        Self {
            extractors: Self::document_extractors(),
        }
    }

    fn document_extractors() -> Vec<Box<dyn ContentExtractor>> {
        vec![
            Box::new(spreadsheet::SpreadsheetExtractor::new()),
            Box::new(word::WordExtractor::new()),
            Box::new(presentation::PresentationExtractor::new()),
            Box::new(text::TextExtractor::new()),
            Box::new(tabular::TabularExtractor::new()),
        ]
    }

    /// `Ok(None)` means the suffix is not handled here. That is a skip, not
    /// a failure.
    pub fn extract(&self, path: &Path) -> Result<Option<ExtractedContent>, ExtractError> {
        let Some(family) = FileFamily::from_path(path) else {
            warn!("Unsupported file type: {}", sanitize::redact_path(path));
            return Ok(None);
        };

        match self.extractors.iter().find(|e| e.supports(family)) {
            Some(extractor) => {
                let content = extractor.extract(path).inspect_err(|e| {
                    debug!("{:?} extraction failed for {}: {}", family, sanitize::redact_path(path), e);
                })?;
                Ok(Some(content))
            }
            None => {
                warn!("No extractor registered for {:?}: {}", family, sanitize::redact_path(path));
                Ok(None)
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Text for a `&name;` or `&#NN;` reference found inside an OOXML text run.
/// Unknown named entities are kept verbatim.
pub(crate) fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, String> {
    if let Some(ch) = reference.resolve_char_ref().map_err(|e| e.to_string())? {
        return Ok(ch.to_string());
    }

    let name = reference.decode().map_err(|e| e.to_string())?;
    Ok(match resolve_predefined_entity(&name) {
        Some(text) => text.to_string(),
        None => format!("&{};", name),
    })
}

pub(crate) fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string()
}

use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;
use crate::extractor::{
    file_extension, resolve_reference, ContentExtractor, ExtractedContent, FileFamily,
};

/// `.docx` paragraphs, one per line. Legacy `.doc` files are rejected.
pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for WordExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        if !path.to_string_lossy().ends_with(".docx") {
            return Err(ExtractError::LegacyFormat(file_extension(path)));
        }

        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::Word(format!("Failed to open DOCX: {}", e)))?;

        let text = extract_docx_text(&mut archive)?;
        Ok(ExtractedContent::Text(text))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::Word)
    }
}

fn extract_docx_text<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<String, ExtractError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Word(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractError::Word(format!("Failed to read document.xml: {}", e)))?;

    parse_document_xml(&xml_content)
}

fn parse_document_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e
                        .decode()
                        .map_err(|e| ExtractError::Word(format!("Invalid text run: {}", e)))?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    let resolved = resolve_reference(&e).map_err(ExtractError::Word)?;
                    text.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Word(format!("XML parsing error: {}", e)));
            }
            _ => {}
        }
    }

    Ok(text)
}

use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;
use crate::extractor::{
    file_extension, resolve_reference, ContentExtractor, ExtractedContent, FileFamily,
};

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// `.pptx` text runs in slide order. Legacy `.ppt` files are rejected.
pub struct PresentationExtractor;

impl PresentationExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PresentationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for PresentationExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        if !path.to_string_lossy().ends_with(".pptx") {
            return Err(ExtractError::LegacyFormat(file_extension(path)));
        }

        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::Presentation(format!("Failed to open PPTX: {}", e)))?;

        let slides = slide_entries(&archive);
        if slides.is_empty() {
            return Err(ExtractError::Presentation(
                "No slides found in presentation".to_string(),
            ));
        }

        let mut runs = Vec::new();
        for (_, name) in slides {
            let xml = read_entry(&mut archive, &name)?;
            let slide_text = parse_slide_xml(&xml)?;
            if !slide_text.is_empty() {
                runs.push(slide_text);
            }
        }

        Ok(ExtractedContent::Text(runs.join("\n")))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::Presentation)
    }
}

/// `ppt/slides/slideN.xml` entries sorted by N, so slide10 follows slide9.
fn slide_entries<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Vec<(u32, String)> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name.strip_prefix(SLIDE_PREFIX)?.strip_suffix(".xml")?;
            number.parse::<u32>().ok().map(|n| (n, name.to_string()))
        })
        .collect();
    slides.sort();
    slides
}

fn read_entry<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String, ExtractError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Presentation(format!("Failed to open {}: {}", name, e)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Presentation(format!("Failed to read {}: {}", name, e)))?;
    Ok(xml)
}

/// Collects `<a:t>` runs; each `<a:p>` paragraph ends a line.
fn parse_slide_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
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
                b"p" => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.decode().map_err(|e| {
                        ExtractError::Presentation(format!("Invalid text run: {}", e))
                    })?;
                    current.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    let resolved = resolve_reference(&e).map_err(ExtractError::Presentation)?;
                    current.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Presentation(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    Ok(lines.join("\n"))
}

//! Builders for binary fixtures: minimal OOXML documents, workbooks and
//! zip archives.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builds an in-memory zip from `(name, bytes)` entries.
pub struct ZipBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries
            .push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            zip.write_all(content).expect("Failed to write zip entry");
        }
        zip.finish().expect("Failed to finish zip").into_inner()
    }
}

/// A `.docx` body with one paragraph per element of `paragraphs`.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    ZipBuilder::new().entry("word/document.xml", xml).build()
}

/// A `.pptx` with one slide per element of `slides`.
pub fn pptx_bytes(slides: &[&str]) -> Vec<u8> {
    let mut builder = ZipBuilder::new();
    for (i, text) in slides.iter().enumerate() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            text
        );
        builder = builder.entry(&format!("ppt/slides/slide{}.xml", i + 1), xml);
    }
    builder.build()
}

/// An `.xlsx` with one sheet per `(name, column_a)` entry, every value an
/// inline string in column A.
pub fn xlsx_bytes(sheets: &[(&str, &[&str])]) -> Vec<u8> {
    let entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, i + 1, i + 1)
        })
        .collect();
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        entries
    );
    let rels: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            )
        })
        .collect();
    let rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    );

    let mut builder = ZipBuilder::new()
        .entry("xl/workbook.xml", workbook)
        .entry("xl/_rels/workbook.xml.rels", rels);
    for (i, (_, column_a)) in sheets.iter().enumerate() {
        let rows: String = column_a
            .iter()
            .enumerate()
            .map(|(r, text)| {
                format!(
                    r#"<row r="{n}"><c r="A{n}" t="inlineStr"><is><t>{text}</t></is></c></row>"#,
                    n = r + 1,
                    text = text
                )
            })
            .collect();
        let sheet = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        );
        builder = builder.entry(&format!("xl/worksheets/sheet{}.xml", i + 1), sheet);
    }
    builder.build()
}

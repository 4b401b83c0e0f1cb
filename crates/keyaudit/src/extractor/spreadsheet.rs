use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use tracing::debug;

use crate::error::ExtractError;
use crate::extractor::{ContentExtractor, ExtractedContent, FileFamily};
use crate::sanitize;

/// Every sheet of an `.xlsx`/`.xlsm`/`.xls`/`.xlsb` workbook, rendered as
/// `Sheet {name}:` followed by one line per row with cells space-separated.
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for SpreadsheetExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    // Chart sheets and the like have no cell range.
                    debug!(
                        "Skipping sheet '{}' in {}: {}",
                        name,
                        sanitize::redact_path(path),
                        e
                    );
                    continue;
                }
            };

            let rows: Vec<String> = range
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();

            sheets.push(format!("Sheet {}:\n{}", name, rows.join("\n")));
        }

        Ok(ExtractedContent::Text(sheets.join("\n\n")))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::Spreadsheet)
    }
}

/// Writes a minimal `.xlsx` with one sheet per `(name, column_a)` entry.
/// An empty string leaves column A blank on that row and puts a note in B.
#[cfg(test)]
pub(crate) fn write_xlsx(path: &Path, sheets: &[(&str, Vec<&str>)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let cell = |reference: String, text: &str| {
        format!(
            r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
            reference, text
        )
    };

    let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
    let options = SimpleFileOptions::default();

    let entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, i + 1, i + 1)
        })
        .collect();
    zip.start_file("xl/workbook.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        entries
    )
    .unwrap();

    let rels: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            )
        })
        .collect();
    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
    .unwrap();

    for (i, (_, column_a)) in sheets.iter().enumerate() {
        let rows: String = column_a
            .iter()
            .enumerate()
            .map(|(r, text)| {
                let n = r + 1;
                let body = if text.is_empty() {
                    cell(format!("B{}", n), "note")
                } else {
                    cell(format!("A{}", n), text)
                };
                format!(r#"<row r="{}">{}</row>"#, n, body)
            })
            .collect();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
        .unwrap();
    }
    zip.finish().unwrap();
}

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::ScanError;
use crate::extractor::FileFamily;

/// Ordered list of paths to scan, read once before the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    paths: Vec<PathBuf>,
}

impl Manifest {
    /// Reads a headerless CSV whose first field is a file path. Trailing
    /// fields are ignored; records with an empty first field are skipped.
    ///
    /// A workbook (`.xlsb`, `.xlsx`, `.xlsm`, `.xls`) is read instead from
    /// column A of every sheet, in sheet order.
    pub fn read(path: &Path) -> Result<Self, ScanError> {
        let file = std::fs::File::open(path).map_err(|e| ScanError::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if FileFamily::from_path(path) == Some(FileFamily::Spreadsheet) {
            drop(file);
            return Self::read_workbook(path);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut paths = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ScanError::ManifestParse {
                path: path.to_path_buf(),
                source: e,
            })?;

            let mut first = record.get(0).unwrap_or("");
            if line == 0 {
                first = first.trim_start_matches('\u{feff}');
            }
            if first.is_empty() {
                debug!("Skipping manifest record {} with empty path", line + 1);
                continue;
            }
            paths.push(PathBuf::from(first));
        }

        Ok(Self { paths })
    }

    fn read_workbook(path: &Path) -> Result<Self, ScanError> {
        let workbook_error = |message: String| ScanError::ManifestWorkbook {
            path: path.to_path_buf(),
            message,
        };
        let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;

        let mut paths = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| workbook_error(format!("sheet '{}': {}", name, e)))?;
            let (Some((first_row, first_col)), Some((last_row, _))) = (range.start(), range.end())
            else {
                debug!("Sheet '{}' is empty", name);
                continue;
            };
            if first_col > 0 {
                debug!("Sheet '{}' has nothing in column A", name);
                continue;
            }

            let before = paths.len();
            for row in first_row..=last_row {
                match range.get_value((row, 0)) {
                    None | Some(Data::Empty) => {}
                    Some(cell) => {
                        let entry = cell.to_string();
                        if !entry.is_empty() {
                            paths.push(PathBuf::from(entry));
                        }
                    }
                }
            }
            info!("Read {} paths from sheet '{}'", paths.len() - before, name);
        }

        Ok(Self { paths })
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ExtractError;
use crate::extractor::{ContentExtractor, ExtractedContent, ExtractorRegistry, FileFamily};
use crate::sanitize;

/// Unpacks a `.zip` into a scratch directory and extracts each member with
/// the member registry. Unreadable and unsupported members are left out of
/// the result; nested archives are never opened.
pub struct ArchiveExtractor {
    members: ExtractorRegistry,
}

impl ArchiveExtractor {
    pub fn new(members: ExtractorRegistry) -> Self {
        Self { members }
    }
}

impl ContentExtractor for ArchiveExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::Archive(format!("Failed to open ZIP: {}", e)))?;

        // Removed when dropped, whichever way this function returns.
        let scratch = tempfile::Builder::new()
            .prefix("keyaudit-zip-")
            .tempdir()
            .map_err(|e| ExtractError::Archive(format!("Failed to create scratch dir: {}", e)))?;

        archive
            .extract(scratch.path())
            .map_err(|e| ExtractError::Archive(format!("Failed to unpack ZIP: {}", e)))?;

        let mut contents = BTreeMap::new();
        for entry in WalkDir::new(scratch.path())
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let member_path = entry.path();
            let Ok(relative) = member_path.strip_prefix(scratch.path()) else {
                continue;
            };
            let member_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if FileFamily::from_path(member_path) == Some(FileFamily::Archive) {
                debug!("Skipping nested archive {} in {}", member_name, sanitize::redact_path(path));
                continue;
            }

            match self.members.extract(member_path) {
                Ok(Some(ExtractedContent::Text(text))) => {
                    contents.insert(member_name, text);
                }
                Ok(Some(ExtractedContent::Archive(_))) | Ok(None) => {
                    debug!("Skipping unsupported member {} in {}", member_name, sanitize::redact_path(path));
                }
                Err(e) => {
                    warn!(
                        "Failed to read member {} in {}: {}",
                        member_name,
                        sanitize::redact_path(path),
                        e
                    );
                }
            }
        }

        Ok(ExtractedContent::Archive(contents))
    }

    fn supports(&self, family: FileFamily) -> bool {
        matches!(family, FileFamily::Archive)
    }
}

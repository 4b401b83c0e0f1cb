use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Matched,
    NotMatched,
    Unreadable,
    Error,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Matched => "Matched",
            OutcomeStatus::NotMatched => "Not Matched",
            OutcomeStatus::Unreadable => "Unreadable",
            OutcomeStatus::Error => "Error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-member hits inside an archive, kept for the narrative channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMatch {
    pub member: String,
    pub hits: Vec<String>,
}

/// The one recorded result for a manifest entry.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub timestamp: DateTime<Local>,
    pub file_path: PathBuf,
    pub status: OutcomeStatus,
    pub matched_keywords: Vec<String>,
    pub error_message: Option<String>,
    pub members: Vec<MemberMatch>,
}

impl FileOutcome {
    fn new(file_path: PathBuf, status: OutcomeStatus) -> Self {
        Self {
            timestamp: Local::now(),
            file_path,
            status,
            matched_keywords: Vec::new(),
            error_message: None,
            members: Vec::new(),
        }
    }

    pub fn scanned(file_path: PathBuf, matched_keywords: Vec<String>, members: Vec<MemberMatch>) -> Self {
        let status = if matched_keywords.is_empty() {
            OutcomeStatus::NotMatched
        } else {
            OutcomeStatus::Matched
        };
        Self {
            matched_keywords,
            members,
            ..Self::new(file_path, status)
        }
    }

    pub fn unreadable(file_path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            error_message: Some(reason.into()),
            ..Self::new(file_path, OutcomeStatus::Unreadable)
        }
    }

    pub fn error(file_path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(file_path, OutcomeStatus::Error)
        }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn joined_keywords(&self) -> String {
        self.matched_keywords.join(", ")
    }
}

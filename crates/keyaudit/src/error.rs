use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyauditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to resolve webhook target: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

/// Failures that abort a whole run. Per-file problems never surface here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read workbook manifest '{path}': {message}")]
    ManifestWorkbook { path: PathBuf, message: String },

    #[error("Result sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Failed to read word-processor document: {0}")]
    Word(String),

    #[error("Failed to read presentation: {0}")]
    Presentation(String),

    #[error("Failed to read tabular file: {0}")]
    Tabular(#[from] csv::Error),

    #[error("Failed to unpack archive: {0}")]
    Archive(String),

    #[error("Legacy binary format '.{0}' has no reader available")]
    LegacyFormat(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create output '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write narrative log: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to write result row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Result sink lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint answered with status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, KeyauditError>;

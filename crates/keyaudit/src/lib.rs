pub mod alert;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;
pub mod sink;
pub mod worker;

pub use alert::{AlertAggregator, AlertNotifier, AlertPayload, LogNotifier, WebhookNotifier};
pub use config::{load_config, Config};
pub use error::{
    ConfigError, ExtractError, KeyauditError, LoggingError, NotifyError, Result, ScanError,
    SinkError, WorkerError,
};
pub use extractor::{ContentExtractor, ExtractedContent, ExtractorRegistry, FileFamily};
pub use matcher::{match_keywords, KeywordSet, MatchResult};
pub use pipeline::{
    ExistenceCheck, ExistenceStatus, ExistenceSummary, FileScanner, Manifest, ScanPipeline, Summary,
};
pub use secrets::{resolve_secret_optional, SecretError};
pub use sink::{FileOutcome, OutcomeStatus, ResultSink, SinkPaths};

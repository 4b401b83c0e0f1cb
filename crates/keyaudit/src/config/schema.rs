use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub keywords: KeywordsConfig,
    pub file_paths: FilePathsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

/// The two keyword lists. Matching treats their union; list identity is
/// not carried into results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsConfig {
    #[serde(rename = "A", default)]
    pub a: Vec<String>,
    #[serde(rename = "B", default)]
    pub b: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePathsConfig {
    /// Manifest of files to scan, one path per CSV record.
    pub csv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_url_file: Option<String>,
    #[serde(default)]
    pub webhook_url_env: Option<String>,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Send errors still buffered below the threshold when the run ends.
    #[serde(default)]
    pub flush_on_finish: bool,
}

fn default_error_threshold() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_url_file: None,
            webhook_url_env: None,
            error_threshold: default_error_threshold(),
            timeout_secs: default_timeout_secs(),
            flush_on_finish: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Outputs are written to `{file_base}.txt` and `{file_base}_results.csv`.
    #[serde(default = "default_file_base")]
    pub file_base: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_base() -> String {
    "logs/scan".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            file_base: default_file_base(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

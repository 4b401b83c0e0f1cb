pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, resolve_webhook_url, validate_config};
pub use schema::{
    Config, FilePathsConfig, KeywordsConfig, LogFormat, LoggingConfig, NotificationsConfig,
};

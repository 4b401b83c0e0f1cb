use std::path::Path;

use secrecy::SecretString;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::secrets::resolve_secret_optional;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Resolves the webhook target. `None` means alerts are logged but not sent.
pub fn resolve_webhook_url(config: &Config) -> Result<Option<SecretString>, ConfigError> {
    let n = &config.notifications;
    Ok(resolve_secret_optional(
        n.webhook_url.as_deref(),
        n.webhook_url_file.as_deref(),
        n.webhook_url_env.as_deref(),
    )?)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let keywords = config.keywords.a.iter().chain(config.keywords.b.iter());
    let mut total = 0usize;
    for keyword in keywords {
        if keyword.is_empty() {
            return Err(ConfigError::Validation {
                message: "Keyword lists must not contain empty strings".to_string(),
            });
        }
        total += 1;
    }
    if total == 0 {
        return Err(ConfigError::Validation {
            message: "At least one keyword is required in list A or B".to_string(),
        });
    }

    if config.file_paths.csv.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "file_paths.csv must name a manifest file".to_string(),
        });
    }

    if config.notifications.error_threshold == 0 {
        return Err(ConfigError::Validation {
            message: "notifications.error_threshold must be at least 1".to_string(),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    if config.logging.file_base.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "logging.file_base must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
keywords:
  A: ["confidential", "secret"]
  B: ["Company"]
file_paths:
  csv: manifest.csv
notifications:
  webhook_url: https://hooks.example.com/abc
  error_threshold: 3
logging:
  level: debug
  format: json
  file_base: out/run
worker_count: 4
"#;

    #[test]
    fn test_load_valid_config() {
        let config = load_config_from_str(VALID).unwrap();
        assert_eq!(config.keywords.a, vec!["confidential", "secret"]);
        assert_eq!(config.keywords.b, vec!["Company"]);
        assert_eq!(config.file_paths.csv, "manifest.csv");
        assert_eq!(config.notifications.error_threshold, 3);
        assert_eq!(config.notifications.timeout_secs, 10);
        assert!(!config.notifications.flush_on_finish);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file_base, "out/run");
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_config_from_str(
            r#"
keywords:
  A: ["x"]
file_paths:
  csv: m.csv
"#,
        )
        .unwrap();
        assert!(config.keywords.b.is_empty());
        assert_eq!(config.notifications.error_threshold, 10);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.file_base, "logs/scan");
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let result = load_config_from_str(
            r#"
keywords:
  A: ["ok", ""]
file_paths:
  csv: m.csv
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_no_keywords() {
        let result = load_config_from_str(
            r#"
keywords:
  A: []
  B: []
file_paths:
  csv: m.csv
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let result = load_config_from_str(
            r#"
keywords:
  A: ["x"]
file_paths:
  csv: m.csv
notifications:
  error_threshold: 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let result = load_config_from_str(
            r#"
keywords:
  A: ["x"]
file_paths:
  csv: m.csv
worker_count: 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = load_config_from_str("keywords: [unclosed");
        assert!(matches!(result, Err(ConfigError::ParseYaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/settings.yaml");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_load_from_file_and_resolve_webhook() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        let url = resolve_webhook_url(&config).unwrap().unwrap();
        assert_eq!(url.expose_secret(), "https://hooks.example.com/abc");
    }

    #[test]
    fn test_no_webhook_configured() {
        let config = load_config_from_str(
            r#"
keywords:
  A: ["x"]
file_paths:
  csv: m.csv
"#,
        )
        .unwrap();
        assert!(resolve_webhook_url(&config).unwrap().is_none());
    }
}

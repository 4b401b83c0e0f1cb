//! Resolution of the alert webhook target from multiple sources.
//!
//! Webhook URLs usually embed a token, so they are resolved in priority order:
//!
//! 1. **Direct value** - `webhook_url: https://...`
//! 2. **File reference** - `webhook_url_file: /run/secrets/webhook` (Docker secrets)
//! 3. **Env var reference** - `webhook_url_env: AUDIT_WEBHOOK_URL`

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves an optional secret. Returns `Ok(None)` when no source is set.
///
/// A direct value wins over a file, and a file wins over an env var. Empty
/// strings count as unset. A source that is set but unreadable is an error.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(Some(SecretString::from(value.to_string())));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        return match fs::read_to_string(&expanded) {
            Ok(content) => Ok(Some(SecretString::from(content.trim().to_string()))),
            Err(e) => Err(SecretError::FileReadError {
                path: expanded,
                source: e,
            }),
        };
    }

    if let Some(name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Ok(None)
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{}", home.to_string_lossy(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_direct_value_takes_priority() {
        let secret = resolve_secret_optional(
            Some("https://direct"),
            Some("/nonexistent"),
            Some("KEYAUDIT_UNUSED"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(secret.expose_secret(), "https://direct");
    }

    #[test]
    fn test_file_value_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://from-file  ").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let secret = resolve_secret_optional(None, Some(&path), None)
            .unwrap()
            .unwrap();
        assert_eq!(secret.expose_secret(), "https://from-file");
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = resolve_secret_optional(None, Some("/nonexistent/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    #[serial]
    fn test_env_var_source() {
        std::env::set_var("KEYAUDIT_TEST_WEBHOOK", "https://from-env");
        let secret = resolve_secret_optional(None, None, Some("KEYAUDIT_TEST_WEBHOOK"))
            .unwrap()
            .unwrap();
        assert_eq!(secret.expose_secret(), "https://from-env");
        std::env::remove_var("KEYAUDIT_TEST_WEBHOOK");
    }

    #[test]
    #[serial]
    fn test_unset_env_var_is_error() {
        std::env::remove_var("KEYAUDIT_TEST_MISSING");
        let result = resolve_secret_optional(None, None, Some("KEYAUDIT_TEST_MISSING"));
        assert!(matches!(result, Err(SecretError::EnvVarNotSet { .. })));
    }

    #[test]
    fn test_no_source_is_none() {
        assert!(resolve_secret_optional(None, Some(""), None)
            .unwrap()
            .is_none());
    }
}

//! Process-wide tracing setup.
//!
//! `RUST_LOG` wins over the configured level. Records emitted through the
//! `log` facade (the worker pool uses it) are forwarded into tracing.

use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;

pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    let fmt_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

    LogTracer::init().map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter {
        filter: config.level.clone(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_configured_level_used_without_env() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "keyaudit=debug,warn".to_string(),
            ..Default::default()
        };
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("keyaudit=debug"));
    }

    #[test]
    #[serial]
    fn test_invalid_level_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "keyaudit=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_filter(&config),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides_config() {
        std::env::set_var("RUST_LOG", "error");
        let config = LoggingConfig::default();
        let filter = build_filter(&config).unwrap();
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.to_string(), "error");
    }
}

//! Subscriber setup for hosts that embed the pipeline.
//!
//! Pipeline code emits `tracing` spans and events; the workflow loop uses
//! `log` macros. Both end up in the same `fmt` subscriber.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingSettings;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// Builds the filter: `RUST_LOG` when given, else the configured level.
pub(crate) fn build_filter(level: &str, env_override: Option<&str>) -> EnvFilter {
    env_override
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

/// Installs the global subscriber. Call once at startup.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(&settings.level, env.as_deref());

    if settings.json {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(true));
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false));
        tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing_log::LogTracer::init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_build_filter_prefers_env() {
        let filter = build_filter("info", Some("rdekit=trace"));
        assert_eq!(filter.to_string(), "rdekit=trace");
    }

    #[test]
    fn test_build_filter_ignores_invalid_env() {
        let filter = build_filter("warn", Some("rdekit=verbose"));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_build_filter_falls_back_to_level() {
        assert_eq!(build_filter("debug", None).to_string(), "debug");
    }

    #[test]
    #[serial]
    fn test_init_logging_only_once() {
        let settings = LoggingSettings::default();
        assert!(init_logging(&settings).is_ok());
        assert!(matches!(
            init_logging(&settings),
            Err(LoggingError::Subscriber(_))
        ));
        log::info!("bridged through tracing");
    }
}

//! Logging configuration for foliochat

use std::path::Path;

use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::{FolioChatError, Result};

/// Initialize logging with configuration, or from `RUST_LOG` when there is none
pub fn init_logging_with_config(config: Option<&LoggingConfig>) -> Result<()> {
    match config {
        Some(config) => init_logging_with_level(&config.level, config.file_dir.as_deref()),
        None => {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,foliochat=warn"));
            install(env_filter, None)
        }
    }
}

/// Initialize logging with a custom log level and optional log directory
pub fn init_logging_with_level(level: &str, file_dir: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::new(format!("{level},foliochat={level}"));
    install(env_filter, file_dir)?;
    tracing::debug!("Logging initialized with level: {}", level);
    Ok(())
}

fn install(env_filter: EnvFilter, file_dir: Option<&str>) -> Result<()> {
    // Console output goes to stderr so streamed answers on stdout stay clean
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let file_layer = match file_dir {
        Some(dir) => {
            let logs_dir = Path::new(dir);
            if !logs_dir.exists() {
                std::fs::create_dir_all(logs_dir)?;
            }

            let file_appender = tracing_appender::rolling::daily(logs_dir, "foliochat.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            // The writer thread must outlive every span; the process owns it until exit
            std::mem::forget(guard);

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| FolioChatError::ConfigError(format!("logging already initialized: {e}")))?;

    if let Some(dir) = file_dir {
        tracing::info!("Log files will be saved to: {}/foliochat.log.YYYY-MM-DD", dir);
    }
    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .map_err(|e| FolioChatError::ConfigError(format!("logging already initialized: {e}")))
}

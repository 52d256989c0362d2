//! Logging initialisation and configuration.
//!
//! # Design
//! - One entry point installs every layer.
//! - Console output goes to stderr so stdout stays free for reports.
//! - An optional file layer records everything at `debug` without colour.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{Result, TelemetryError};

/// Default console level when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the subscriber cannot
/// be installed (for example, because another subscriber is already set).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    if let Some(path) = config.log_file {
        layers.push(file_layer(open_log_file(path)?));
    }
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Console log level (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format of the console layer.
    pub format: LogFormat,
    /// File receiving a `debug`-level copy of every record.
    pub log_file: Option<&'a Path>,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

/// Available output formats for the console logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit compact human-readable lines.
    Pretty,
}

fn console_layer(config: &LoggingConfig<'_>) -> BoxedLayer {
    let filter = build_env_filter(config.level);
    match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(file: File) -> BoxedLayer {
    fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG)
        .boxed()
}

fn open_log_file(path: &Path) -> Result<File> {
    let to_error = |source: io::Error| TelemetryError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_parents_are_created() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("logs").join("amr.log");
        open_log_file(&path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn default_config_is_quiet_console_only() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(config.log_file.is_none());
    }
}

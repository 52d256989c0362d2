//! Logging setup errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for logging setup.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing the log sinks.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        #[source]
        source: TryInitError,
    },
    /// The log file or one of its parent directories could not be opened.
    #[error("failed to open log file '{}'", .path.display())]
    LogFile {
        /// Requested log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn log_file_errors_name_the_path() {
        let err = TelemetryError::LogFile {
            path: PathBuf::from("logs/amr.log"),
            source: io::Error::other("denied"),
        };
        assert_eq!(err.to_string(), "failed to open log file 'logs/amr.log'");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("denied")
        );
    }
}

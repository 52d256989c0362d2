//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem access failed.
    #[error("failed to {operation} '{}'", .path.display())]
    Io {
        /// Operation being attempted.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A YAML document could not be parsed or produced.
    #[error("invalid YAML configuration in '{}'", .path.display())]
    Yaml {
        /// File being read or written.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A JSON document could not be parsed or produced.
    #[error("invalid JSON configuration in '{}'", .path.display())]
    Json {
        /// File being read or written.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The file extension does not name a supported format.
    #[error("unsupported configuration format for '{}' (use .yaml, .yml, or .json)", .path.display())]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },
    /// Refused to overwrite an existing file.
    #[error("configuration file '{}' already exists", .path.display())]
    AlreadyExists {
        /// Existing path.
        path: PathBuf,
    },
    /// A required field was empty.
    #[error("missing value for '{field}' in '{section}'")]
    MissingField {
        /// Section containing the field.
        section: &'static str,
        /// Name of the field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid value for '{field}' in '{section}': {reason}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let missing = ConfigError::MissingField {
            section: "tmdb",
            field: "api_key",
        };
        assert_eq!(missing.to_string(), "missing value for 'api_key' in 'tmdb'");

        let invalid = ConfigError::InvalidField {
            section: "amr",
            field: "timeout_secs",
            value: Some("0".to_string()),
            reason: "must be greater than zero",
        };
        assert_eq!(
            invalid.to_string(),
            "invalid value for 'timeout_secs' in 'amr': must be greater than zero"
        );
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err = ConfigError::Io {
            operation: "read",
            path: PathBuf::from("config.yaml"),
            source: io::Error::other("denied"),
        };
        assert_eq!(err.to_string(), "failed to read 'config.yaml'");
        assert!(std::error::Error::source(&err).is_some());
    }
}

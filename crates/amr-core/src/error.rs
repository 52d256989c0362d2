//! Error types for the core media-rename model.

use thiserror::Error;

/// Errors raised while building rename inputs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A template referenced a field absent from the variable bag.
    #[error("template field '{key}' is not available")]
    MissingField {
        /// Name of the missing field.
        key: String,
        /// Template that referenced it.
        template: String,
    },
    /// A template could not be parsed.
    #[error("malformed name template")]
    InvalidTemplate {
        /// Offending template text.
        template: String,
        /// Byte offset of the first problem.
        position: usize,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A field's format specification does not apply to its value.
    #[error("unsupported format specification for field '{key}'")]
    InvalidFormatSpec {
        /// Field the specification was attached to.
        key: String,
        /// Raw specification text.
        spec: String,
    },
    /// A range selector could not be parsed.
    #[error("invalid index range")]
    InvalidRange {
        /// Raw selector text.
        input: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A classification pattern did not compile.
    #[error("invalid file pattern")]
    InvalidPattern {
        /// Raw pattern text.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;

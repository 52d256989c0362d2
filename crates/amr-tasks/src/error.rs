//! Error types for task execution.

use std::io;

use thiserror::Error;

/// Errors surfaced by the execution layer.
///
/// Transport and remote failures never appear here; they are folded into
/// each task's [`amr_core::ApiResponse`]. Only the decision to stop a run does.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task that must succeed did not.
    #[error("{function} failed (status {status_code}): {message}")]
    Fatal {
        /// Name of the failed call.
        function: String,
        /// Rendered call arguments, secrets redacted.
        arguments: String,
        /// Status recorded for the failure.
        status_code: i64,
        /// Failure message.
        message: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The blocking façade could not start its runtime.
    #[error("failed to start task runtime")]
    Runtime {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Convenience alias for task results.
pub type TaskResult<T> = Result<T, TaskError>;

//! Deferred remote calls.

use std::error::Error as StdError;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use amr_core::ApiResponse;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::ExecutionContext;

/// Maps a raw reply to an [`ApiResponse`]. Parsers never fail: undecodable
/// bodies become failed responses.
pub type ResponseParser = fn(StatusCode, &[u8]) -> ApiResponse;

/// Presentation callback invoked once per finished task.
pub type OutputHandler = Arc<dyn Fn(&TaskRecord) + Send + Sync>;

type RequestFactory = Box<dyn Fn(&Client) -> RequestBuilder + Send + Sync>;

const REDACTED: &str = "******";
const NOT_SENT: &str = "not sent: an earlier required task failed";

/// Outcome of one task, as logged and presented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    /// Name of the remote call.
    pub function: String,
    /// Bound arguments, secrets redacted.
    pub arguments: Vec<(String, String)>,
    /// Whether a failure stops the run.
    pub raise_error: bool,
    /// Whether the request was actually issued.
    pub sent: bool,
    /// Normalised outcome.
    pub response: ApiResponse,
}

impl TaskRecord {
    /// Whether this record must stop the run. Unsent placeholders never are.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.sent && self.raise_error && !self.response.is_success()
    }

    /// Arguments rendered as `name=value` pairs.
    #[must_use]
    pub fn arguments_display(&self) -> String {
        self.arguments
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One deferred remote call.
///
/// Sending consumes the task, so a task is executed at most once.
pub struct ApiTask {
    function: String,
    arguments: Vec<(String, String)>,
    request: RequestFactory,
    parser: ResponseParser,
    output: Option<OutputHandler>,
    raise_error: bool,
}

impl ApiTask {
    /// Tolerant task named `function` built by `request` and parsed by `parser`.
    pub fn new(
        function: impl Into<String>,
        request: impl Fn(&Client) -> RequestBuilder + Send + Sync + 'static,
        parser: ResponseParser,
    ) -> Self {
        Self {
            function: function.into(),
            arguments: Vec::new(),
            request: Box::new(request),
            parser,
            output: None,
            raise_error: false,
        }
    }

    /// Record a bound argument for logs and output.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.arguments.push((name.into(), value.to_string()));
        self
    }

    /// Record a bound argument whose value must not be logged.
    #[must_use]
    pub fn secret_argument(mut self, name: impl Into<String>, value: &str) -> Self {
        let shown = if value.is_empty() { "" } else { REDACTED };
        self.arguments.push((name.into(), shown.to_string()));
        self
    }

    /// Declare whether a failure stops the run.
    #[must_use]
    pub const fn raise_error(mut self, raise_error: bool) -> Self {
        self.raise_error = raise_error;
        self
    }

    /// Attach a presentation callback.
    #[must_use]
    pub fn with_output(mut self, output: OutputHandler) -> Self {
        self.output = Some(output);
        self
    }

    /// Name of the remote call.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Bound arguments.
    #[must_use]
    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    /// Whether a failure stops the run.
    #[must_use]
    pub const fn raises_error(&self) -> bool {
        self.raise_error
    }

    /// Execute the request and record its outcome.
    ///
    /// Transport failures, timeouts included, become responses with status
    /// `-1`. The record is logged, appended to the context's task log, and
    /// handed to the output callback whether or not the call succeeded.
    pub async fn send(self, context: &ExecutionContext) -> TaskRecord {
        let response = match (self.request)(context.client()).send().await {
            Ok(reply) => {
                let status = reply.status();
                match reply.bytes().await {
                    Ok(body) => (self.parser)(status, &body),
                    Err(err) => ApiResponse::transport_failure(describe(&err)),
                }
            }
            Err(err) => ApiResponse::transport_failure(describe(&err)),
        };

        let record = TaskRecord {
            function: self.function,
            arguments: self.arguments,
            raise_error: self.raise_error,
            sent: true,
            response,
        };
        info!(
            function = %record.function,
            arguments = %record.arguments_display(),
            success = record.response.is_success(),
            status_code = record.response.status_code(),
            error = %record.response.error(),
            "task finished"
        );
        debug!(function = %record.function, data = %record.response.data(), "task payload");

        context.log().append(record.clone());
        if let Some(output) = &self.output {
            output(&record);
        }
        record
    }

    /// Placeholder record for a task dropped after a fatal failure.
    pub(crate) fn skip(self) -> TaskRecord {
        TaskRecord {
            function: self.function,
            arguments: self.arguments,
            raise_error: self.raise_error,
            sent: false,
            response: ApiResponse::failure(0, NOT_SENT, serde_json::Value::Null),
        }
    }
}

impl Debug for ApiTask {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiTask")
            .field("function", &self.function)
            .field("arguments", &self.arguments)
            .field("raise_error", &self.raise_error)
            .field("has_output", &self.output.is_some())
            .finish_non_exhaustive()
    }
}

fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_parser(status: StatusCode, _body: &[u8]) -> ApiResponse {
        ApiResponse::success(i64::from(status.as_u16()), serde_json::Value::Null)
    }

    #[test]
    fn secrets_are_redacted_in_arguments() {
        let task = ApiTask::new("auth_login", |client| client.get("http://localhost"), noop_parser)
            .argument("username", "admin")
            .secret_argument("password", "hunter2")
            .secret_argument("otp_code", "");
        assert_eq!(
            task.arguments(),
            &[
                ("username".to_string(), "admin".to_string()),
                ("password".to_string(), "******".to_string()),
                ("otp_code".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn skipped_tasks_are_marked_unsent() {
        let record = ApiTask::new("fs_rename", |client| client.get("http://localhost"), noop_parser)
            .raise_error(true)
            .skip();
        assert!(!record.sent);
        assert!(!record.is_fatal());
        assert!(record.response.error().starts_with("not sent"));
    }

    #[test]
    fn arguments_render_as_pairs() {
        let record = TaskRecord {
            function: "fs_list".to_string(),
            arguments: vec![
                ("path".to_string(), "/tv/".to_string()),
                ("refresh".to_string(), "true".to_string()),
            ],
            raise_error: true,
            sent: true,
            response: ApiResponse::success(200, serde_json::Value::Null),
        };
        assert_eq!(record.arguments_display(), "path=/tv/, refresh=true");
        assert!(!record.is_fatal());
    }
}

//! Shared run context, remote clients, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use amr_api::{AlistClient, TmdbClient};
use amr_config::Settings;
use amr_tasks::{ExecutionContext, TaskError};
use anyhow::anyhow;

use crate::cli::OutputFormat;

/// CLI-level error type separating bad input, operational failures, required
/// remote calls that failed, and user aborts.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Remote(TaskError),
    Aborted,
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Remote(_) => 4,
            Self::Aborted => 0,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Remote(error) => error.to_string(),
            Self::Aborted => "aborted by user".to_string(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Everything a rename command needs for one run.
pub(crate) struct AppContext {
    pub(crate) settings: Settings,
    pub(crate) execution: ExecutionContext,
    pub(crate) alist: AlistClient,
    pub(crate) tmdb: TmdbClient,
    pub(crate) assume_yes: bool,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the HTTP client and both remote adapters from `settings`.
    pub(crate) fn from_settings(
        settings: Settings,
        assume_yes: bool,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let execution = ExecutionContext::with_timeout(
            Duration::from_secs(settings.amr.timeout_secs),
            settings.amr.in_flight_limit,
        )
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        let alist = AlistClient::new(&settings.alist.url)
            .map_err(|err| CliError::validation(format!("alist.url: {err}")))?;
        let tmdb = TmdbClient::new(
            &settings.tmdb.api_url,
            &settings.tmdb.api_key,
            &settings.tmdb.language,
        )
        .map_err(|err| CliError::validation(format!("tmdb.api_url: {err}")))?;

        Ok(Self {
            settings,
            execution,
            alist,
            tmdb,
            assume_yes,
            output,
        })
    }

    /// Whether batches run concurrently.
    pub(crate) const fn concurrent(&self) -> bool {
        self.settings.amr.rename_by_async
    }

    /// Whether per-task progress lines go to stdout.
    pub(crate) fn prints_progress(&self) -> bool {
        self.output == OutputFormat::Table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("io")).exit_code(), 3);
        let remote = CliError::Remote(TaskError::Fatal {
            function: "alist.login".to_string(),
            arguments: String::new(),
            status_code: 400,
            message: "wrong password".to_string(),
        });
        assert_eq!(remote.exit_code(), 4);
        assert_eq!(
            remote.display_message(),
            "alist.login failed (status 400): wrong password"
        );
        assert_eq!(CliError::Aborted.exit_code(), 0);
    }

    #[test]
    fn context_rejects_unusable_urls() {
        let mut settings = Settings::default();
        settings.alist.url = "alist.local".to_string();
        let result = AppContext::from_settings(settings, true, OutputFormat::Table);
        assert!(matches!(result, Err(CliError::Validation(_))));
    }
}

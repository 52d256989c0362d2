//! Per-run execution context.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::Client;

use crate::error::{TaskError, TaskResult};
use crate::task::TaskRecord;

/// State shared by every task of one run.
///
/// Built once per run and passed explicitly; cloning shares the same client
/// and log.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    client: Client,
    in_flight_limit: usize,
    log: TaskLog,
}

impl ExecutionContext {
    /// Context around an existing client. An `in_flight_limit` of `0` leaves
    /// concurrent batches unthrottled.
    #[must_use]
    pub fn new(client: Client, in_flight_limit: usize) -> Self {
        Self {
            client,
            in_flight_limit,
            log: TaskLog::default(),
        }
    }

    /// Context with a fresh client applying `timeout` to every request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Client`] if the client cannot be built.
    pub fn with_timeout(timeout: Duration, in_flight_limit: usize) -> TaskResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TaskError::Client { source })?;
        Ok(Self::new(client, in_flight_limit))
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Maximum simultaneous requests; `0` means unlimited.
    #[must_use]
    pub const fn in_flight_limit(&self) -> usize {
        self.in_flight_limit
    }

    /// Append-only record of every finished task.
    #[must_use]
    pub const fn log(&self) -> &TaskLog {
        &self.log
    }
}

/// Append-only list of finished task records.
#[derive(Debug, Clone, Default)]
pub struct TaskLog {
    records: Arc<Mutex<Vec<TaskRecord>>>,
}

impl TaskLog {
    /// Record a finished task.
    pub fn append(&self, record: TaskRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Copy of every record so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

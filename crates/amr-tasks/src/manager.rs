//! Batch execution of queued tasks.

use std::future::Future;

use amr_core::ApiResponse;
use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::context::ExecutionContext;
use crate::error::{TaskError, TaskResult};
use crate::task::{ApiTask, TaskRecord};

/// Queue of pending tasks bound to one execution context.
#[derive(Debug)]
pub struct TaskManager {
    context: ExecutionContext,
    pending: Vec<ApiTask>,
}

impl TaskManager {
    /// Empty queue using `context` for every batch.
    #[must_use]
    pub const fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            pending: Vec::new(),
        }
    }

    /// Context shared by queued tasks.
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Queue one task.
    pub fn add_task(&mut self, task: ApiTask) -> &mut Self {
        self.pending.push(task);
        self
    }

    /// Queue several tasks, keeping their order.
    pub fn add_tasks(&mut self, tasks: impl IntoIterator<Item = ApiTask>) -> &mut Self {
        self.pending.extend(tasks);
        self
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drain the queue and execute it.
    ///
    /// Records come back in the order tasks were added. Sequential batches stop
    /// after the first fatal failure and fill the rest with unsent
    /// placeholders; concurrent batches let in-flight siblings finish.
    pub async fn run_tasks(&mut self, concurrent: bool) -> BatchReport {
        let tasks = std::mem::take(&mut self.pending);
        let records = if concurrent {
            self.run_concurrent(tasks).await
        } else {
            self.run_sequential(tasks).await
        };
        let report = BatchReport { records };
        if let Some(fatal) = report.fatal() {
            error!(
                function = %fatal.function,
                arguments = %fatal.arguments_display(),
                error = %fatal.response.error(),
                "required task failed"
            );
        }
        report
    }

    /// Run [`TaskManager::run_tasks`] to completion on a private runtime.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Runtime`] if the runtime cannot be started.
    pub fn run_tasks_blocking(&mut self, concurrent: bool) -> TaskResult<BatchReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| TaskError::Runtime { source })?;
        Ok(runtime.block_on(self.run_tasks(concurrent)))
    }

    async fn run_sequential(&self, tasks: Vec<ApiTask>) -> Vec<TaskRecord> {
        let mut records = Vec::with_capacity(tasks.len());
        let mut queue = tasks.into_iter();
        for task in queue.by_ref() {
            let record = task.send(&self.context).await;
            let fatal = record.is_fatal();
            records.push(record);
            if fatal {
                break;
            }
        }
        let skipped = queue.len();
        if skipped > 0 {
            warn!(skipped, "remaining tasks not sent after a required task failed");
            records.extend(queue.map(ApiTask::skip));
        }
        records
    }

    async fn run_concurrent(&self, tasks: Vec<ApiTask>) -> Vec<TaskRecord> {
        let context = &self.context;
        run_bounded(
            tasks.into_iter().map(|task| task.send(context)),
            context.in_flight_limit(),
        )
        .await
    }
}

/// Await every future, with at most `limit` running at once (`0` = no cap).
/// Outputs keep input order.
pub(crate) async fn run_bounded<F, T>(futures: impl IntoIterator<Item = F>, limit: usize) -> Vec<T>
where
    F: Future<Output = T>,
{
    let semaphore = (limit > 0).then(|| Semaphore::new(limit));
    let semaphore = semaphore.as_ref();
    join_all(futures.into_iter().map(|future| async move {
        let _permit = match semaphore {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };
        future.await
    }))
    .await
}

/// Records of one drained batch, in queue order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    records: Vec<TaskRecord>,
}

impl BatchReport {
    /// Every record in queue order.
    #[must_use]
    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    /// First record that must stop the run.
    #[must_use]
    pub fn fatal(&self) -> Option<&TaskRecord> {
        self.records.iter().find(|record| record.is_fatal())
    }

    /// Responses in queue order, regardless of failures.
    #[must_use]
    pub fn into_responses(self) -> Vec<ApiResponse> {
        self.records
            .into_iter()
            .map(|record| record.response)
            .collect()
    }

    /// Responses in queue order, or the first fatal failure.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Fatal`] describing the first required task that failed.
    pub fn into_result(self) -> TaskResult<Vec<ApiResponse>> {
        if let Some(fatal) = self.fatal() {
            return Err(TaskError::Fatal {
                function: fatal.function.clone(),
                arguments: fatal.arguments_display(),
                status_code: fatal.response.status_code(),
                message: fatal.response.error().to_string(),
            });
        }
        Ok(self.into_responses())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

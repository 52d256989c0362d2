#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Execution layer for remote calls.
//!
//! An [`ApiTask`] is one deferred request: how to build it, how to parse the
//! reply into an [`amr_core::ApiResponse`], where to present the outcome, and
//! whether a failure must stop the run. A [`TaskManager`] drains queued tasks
//! sequentially or concurrently and always returns outcomes in queue order.
//!
//! Layout:
//! - `context.rs`: shared HTTP client, in-flight limit, and task log
//! - `task.rs`: `ApiTask` and `TaskRecord`
//! - `manager.rs`: `TaskManager`, `BatchReport`, bounded execution
//! - `error.rs`: `TaskError`

pub mod context;
pub mod error;
pub mod manager;
pub mod task;

pub use context::{ExecutionContext, TaskLog};
pub use error::{TaskError, TaskResult};
pub use manager::{BatchReport, TaskManager};
pub use task::{ApiTask, OutputHandler, ResponseParser, TaskRecord};

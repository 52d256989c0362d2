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

//! Core media-rename model shared by the task layer, the API adapters, and the CLI.
//!
//! Nothing in this crate performs I/O. Remote listings and metadata arrive as
//! plain values and leave as [`RenameTask`] intents.
//!
//! Layout:
//! - `folder.rs`: remote directory path normalisation
//! - `sanitize.rs`: filesystem-illegal character replacement
//! - `template.rs`: `{field:spec}` title templates and typed format values
//! - `media.rs`: canonical media identities (`MediaMeta`) and their variables
//! - `file.rs`: remote listing entries and candidate files
//! - `inventory.rs`: video/subtitle classification in natural order
//! - `range.rs`: 1-based index/range selector
//! - `reconcile.rs`: title to file pairing and `RenameTask`
//! - `response.rs`: normalised remote call outcome
//! - `summary.rs`: per-category result tallies

pub mod error;
pub mod file;
pub mod folder;
pub mod inventory;
pub mod media;
pub mod range;
pub mod reconcile;
pub mod response;
pub mod sanitize;
pub mod summary;
pub mod template;

pub use error::{CoreError, CoreResult};
pub use file::{FileMeta, RemoteEntry};
pub use folder::Folder;
pub use inventory::{InventoryFilter, natural_sort};
pub use media::{
    EpisodeVariables, MediaKind, MediaMeta, MediaVariables, MovieVariables, TvVariables,
};
pub use range::RangeSelector;
pub use reconcile::{Reconciliation, Reconciler, RenameTask};
pub use response::ApiResponse;
pub use sanitize::sanitize_name;
pub use summary::{CategoryTally, FailedRename, FolderOutcome, RenameCategory, RenameSummary};
pub use template::{FormatValue, FormatVariables, Template};

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

//! File-backed configuration for the media renamer.
//!
//! Layout: `model.rs` (typed settings sections), `defaults.rs` (default
//! values), `validate.rs` (load-time validation), `loader.rs` (YAML/JSON
//! read and write), `error.rs` (`ConfigError`).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::DEFAULT_CONFIG_PATH;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, load, load_unvalidated, save};
pub use model::{AlistConfig, AmrConfig, Settings, TmdbConfig};

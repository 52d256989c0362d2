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

//! Adapters for the two remote collaborators.
//!
//! Every remote operation is returned as an unsent [`amr_tasks::ApiTask`]
//! carrying its own response parser, so callers decide how and when the
//! calls run. Typed payloads are read back from the resulting
//! [`amr_core::ApiResponse`] values.
//!
//! Layout:
//! - `alist.rs`: login, listing, and rename against an Alist site
//! - `tmdb.rs`: search and detail lookups plus their wire models
//! - `totp.rs`: one-time codes for two-factor login
//! - `wire.rs`: payload decoding helpers
//! - `error.rs`: `ApiError`

pub mod alist;
pub mod error;
pub mod tmdb;
pub mod totp;
pub mod wire;

pub use alist::{AlistClient, ListData, LoginData, list_entries, parse_alist, parse_alist_list};
pub use error::{ApiError, ApiResult};
pub use tmdb::{
    DEFAULT_API_URL, EpisodeInfo, MovieInfo, MovieSearchItem, SearchResults, SeasonInfo,
    SeasonSummary, TmdbClient, TvInfo, TvSearchItem, parse_tmdb,
};
pub use totp::{Totp, current_code, is_valid_secret};
pub use wire::payload;

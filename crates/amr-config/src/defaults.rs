//! Default values for every optional setting.
//!
//! # Design
//! - Keep defaults in one place so serde, templates, and tests agree.

/// Configuration file used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

pub(crate) const TMDB_API_URL: &str = "https://api.themoviedb.org/3";
pub(crate) const TMDB_LANGUAGE: &str = "zh-CN";

pub(crate) const MOVIE_NAME_FORMAT: &str = "{name} ({year})";
pub(crate) const MOVIE_FOLDER_NAME_FORMAT: &str = "{name} ({year})";
pub(crate) const TV_NAME_FORMAT: &str = "{name}-S{season:0>2}E{episode:0>2}.{title}";
pub(crate) const TV_FOLDER_NAME_FORMAT: &str = "{name} ({year})";

pub(crate) const VIDEO_REGEX_PATTERN: &str = r"(?i).*\.(avi|flv|wmv|mov|mp4|mkv|rm|rmvb)$";
pub(crate) const SUBTITLE_REGEX_PATTERN: &str = r"(?i).*\.(ass|srt|ssa|sub)$";

/// Simultaneous requests allowed in a concurrent batch.
pub(crate) const IN_FLIGHT_LIMIT: usize = 5;
/// Per-request timeout.
pub(crate) const TIMEOUT_SECS: u64 = 10;

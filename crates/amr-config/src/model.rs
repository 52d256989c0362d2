//! Typed configuration sections.
//!
//! Every section rejects unknown keys. Optional keys fall back to
//! the values in `defaults.rs`; required keys are checked by
//! [`Settings::validate`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;

/// Complete settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Filesystem provider connection.
    pub alist: AlistConfig,
    /// Metadata provider connection.
    pub tmdb: TmdbConfig,
    /// Renaming behaviour.
    pub amr: AmrConfig,
}

/// Alist connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlistConfig {
    /// Base URL of the Alist server.
    pub url: String,
    /// Skip login and browse as the guest user.
    pub guest_mode: bool,
    /// Account name.
    pub user: String,
    /// Account password.
    pub password: String,
    /// Base32 TOTP secret for two-factor login; empty when unused.
    pub totp: String,
}

/// TMDB connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TmdbConfig {
    /// API root including the version segment.
    pub api_url: String,
    /// v3 API key.
    pub api_key: String,
    /// Language requested for titles.
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::TMDB_API_URL.to_string(),
            api_key: String::new(),
            language: defaults::TMDB_LANGUAGE.to_string(),
        }
    }
}

/// Renaming behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmrConfig {
    /// Leave files that already carry their title out of the rename batch.
    pub exclude_renamed: bool,
    /// Send rename batches concurrently.
    pub rename_by_async: bool,
    /// Rename the media folder after its files.
    pub media_folder_rename: bool,
    /// Template for movie files.
    pub movie_name_format: String,
    /// Template for movie folders.
    pub movie_folder_name_format: String,
    /// Template for episode files.
    pub tv_name_format: String,
    /// Template for series folders.
    pub tv_folder_name_format: String,
    /// Pattern selecting video files.
    pub video_regex_pattern: String,
    /// Pattern selecting subtitle files.
    pub subtitle_regex_pattern: String,
    /// Maximum simultaneous requests in a concurrent batch. Zero or a negative
    /// value in the document disables the cap and is stored as `0`.
    #[serde(deserialize_with = "limit_or_unthrottled")]
    pub in_flight_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AmrConfig {
    fn default() -> Self {
        Self {
            exclude_renamed: true,
            rename_by_async: true,
            media_folder_rename: true,
            movie_name_format: defaults::MOVIE_NAME_FORMAT.to_string(),
            movie_folder_name_format: defaults::MOVIE_FOLDER_NAME_FORMAT.to_string(),
            tv_name_format: defaults::TV_NAME_FORMAT.to_string(),
            tv_folder_name_format: defaults::TV_FOLDER_NAME_FORMAT.to_string(),
            video_regex_pattern: defaults::VIDEO_REGEX_PATTERN.to_string(),
            subtitle_regex_pattern: defaults::SUBTITLE_REGEX_PATTERN.to_string(),
            in_flight_limit: defaults::IN_FLIGHT_LIMIT,
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

fn limit_or_unthrottled<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(usize::try_from(raw).unwrap_or(0))
}

const MASK: &str = "******";

impl Settings {
    /// Copy with every secret replaced by a fixed mask. Empty secrets stay empty.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                MASK.to_string()
            }
        };
        let mut masked = self.clone();
        masked.alist.password = mask(&self.alist.password);
        masked.alist.totp = mask(&self.alist.totp);
        masked.tmdb.api_key = mask(&self.tmdb.api_key);
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"alist":{"url":"http://nas:5244"}}"#).expect("settings");
        assert_eq!(settings.alist.url, "http://nas:5244");
        assert_eq!(settings.tmdb.language, "zh-CN");
        assert_eq!(settings.amr.in_flight_limit, 5);
        assert!(settings.amr.exclude_renamed);
    }

    #[test]
    fn non_positive_limits_disable_the_cap() {
        for (raw, expected) in [("-3", 0), ("0", 0), ("2", 2)] {
            let settings: Settings =
                serde_json::from_str(&format!(r#"{{"amr":{{"in_flight_limit":{raw}}}}}"#))
                    .expect("settings");
            assert_eq!(settings.amr.in_flight_limit, expected, "limit {raw}");
        }
        let settings: Settings =
            serde_yaml::from_str("amr:\n  in_flight_limit: -1\n").expect("settings");
        assert_eq!(settings.amr.in_flight_limit, 0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<Settings>(r#"{"amr":{"rename_async":true}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn masking_hides_secrets_only() {
        let mut settings = Settings::default();
        settings.alist.user = "admin".to_string();
        settings.alist.password = "hunter2".to_string();
        settings.tmdb.api_key = "key".to_string();
        let masked = settings.masked();
        assert_eq!(masked.alist.user, "admin");
        assert_eq!(masked.alist.password, MASK);
        assert_eq!(masked.alist.totp, "");
        assert_eq!(masked.tmdb.api_key, MASK);
    }
}

//! Load-time validation of settings documents.

use amr_core::media::{EPISODE_FIELDS, MOVIE_FIELDS, TV_FIELDS};
use amr_core::{InventoryFilter, Template};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Settings;

const BASE32_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

impl Settings {
    /// Validate every section, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for required values left empty and
    /// [`ConfigError::InvalidField`] for values that cannot be used.
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_alist()?;
        self.validate_tmdb()?;
        self.validate_amr()
    }

    fn validate_alist(&self) -> ConfigResult<()> {
        let alist = &self.alist;
        require("alist", "url", &alist.url)?;
        ensure_http_url("alist", "url", &alist.url)?;
        if !alist.guest_mode {
            require("alist", "user", &alist.user)?;
            require("alist", "password", &alist.password)?;
        }
        if !is_base32(&alist.totp) {
            return Err(ConfigError::InvalidField {
                section: "alist",
                field: "totp",
                value: None,
                reason: "must be a base32 secret",
            });
        }
        Ok(())
    }

    fn validate_tmdb(&self) -> ConfigResult<()> {
        let tmdb = &self.tmdb;
        require("tmdb", "api_url", &tmdb.api_url)?;
        ensure_http_url("tmdb", "api_url", &tmdb.api_url)?;
        require("tmdb", "api_key", &tmdb.api_key)?;
        require("tmdb", "language", &tmdb.language)
    }

    fn validate_amr(&self) -> ConfigResult<()> {
        let amr = &self.amr;
        let episode_fields: Vec<&str> = TV_FIELDS.iter().chain(EPISODE_FIELDS).copied().collect();
        ensure_template("movie_name_format", &amr.movie_name_format, MOVIE_FIELDS)?;
        ensure_template(
            "movie_folder_name_format",
            &amr.movie_folder_name_format,
            MOVIE_FIELDS,
        )?;
        ensure_template("tv_name_format", &amr.tv_name_format, &episode_fields)?;
        ensure_template("tv_folder_name_format", &amr.tv_folder_name_format, TV_FIELDS)?;
        ensure_pattern("video_regex_pattern", &amr.video_regex_pattern)?;
        ensure_pattern("subtitle_regex_pattern", &amr.subtitle_regex_pattern)?;
        if amr.timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                section: "amr",
                field: "timeout_secs",
                value: Some(amr.timeout_secs.to_string()),
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

fn require(section: &'static str, field: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { section, field });
    }
    Ok(())
}

fn ensure_http_url(section: &'static str, field: &'static str, value: &str) -> ConfigResult<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section,
            field,
            value: Some(value.to_string()),
            reason: "must be an http or https URL",
        })
    }
}

fn ensure_template(field: &'static str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    let invalid = |reason: &'static str| ConfigError::InvalidField {
        section: "amr",
        field,
        value: Some(value.to_string()),
        reason,
    };
    require("amr", field, value)?;
    let template = Template::parse(value).map_err(|_| invalid("template is malformed"))?;
    if template.fields().any(|key| !allowed.contains(&key)) {
        return Err(invalid("template references an unknown field"));
    }
    Ok(())
}

fn ensure_pattern(field: &'static str, value: &str) -> ConfigResult<()> {
    require("amr", field, value)?;
    InventoryFilter::new(value)
        .map(drop)
        .map_err(|_| ConfigError::InvalidField {
            section: "amr",
            field,
            value: Some(value.to_string()),
            reason: "must be a valid regular expression",
        })
}

fn is_base32(secret: &str) -> bool {
    secret
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '=')
        .all(|ch| BASE32_ALPHABET.contains(ch.to_ascii_uppercase()))
}

//! Reading and writing settings files.
//!
//! # Design
//! - The format follows the file extension; YAML and JSON share one model.
//! - Loading validates; saving writes whatever the caller built.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Settings;

/// Serialisation format of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` or `.yml`.
    Yaml,
    /// `.json`.
    Json,
}

impl ConfigFormat {
    /// Pick the format from `path`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read and validate settings from `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, or when
/// [`Settings::validate`] rejects it.
pub fn load(path: &Path) -> ConfigResult<Settings> {
    let settings = load_unvalidated(path)?;
    settings.validate()?;
    info!(path = %path.display(), "configuration loaded");
    Ok(settings)
}

/// Read settings from `path` without validating them.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_unvalidated(path: &Path) -> ConfigResult<Settings> {
    let format = ConfigFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let settings = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        ConfigFormat::Json => {
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
    };
    debug!(path = %path.display(), ?format, "configuration parsed");
    Ok(settings)
}

/// Write `settings` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] when `path` exists and `overwrite`
/// is false, and IO or serialisation errors otherwise.
pub fn save(settings: &Settings, path: &Path, overwrite: bool) -> ConfigResult<()> {
    let format = ConfigFormat::from_path(path)?;
    if !overwrite && path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let text = match format {
        ConfigFormat::Yaml => {
            serde_yaml::to_string(settings).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        ConfigFormat::Json => {
            serde_json::to_string_pretty(settings).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| ConfigError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "configuration saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() -> ConfigResult<()> {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML"))?, ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json"))?, ConfigFormat::Json);
        assert!(matches!(
            ConfigFormat::from_path(&PathBuf::from("a.toml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        Ok(())
    }
}

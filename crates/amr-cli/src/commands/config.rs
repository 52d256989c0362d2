use std::io::{self, IsTerminal};
use std::path::Path;

use amr_api::is_valid_secret;
use amr_config::{ConfigError, Settings, load, save};

use crate::cli::{ConfigInitArgs, OutputFormat};
use crate::client::{CliError, CliResult};
use crate::output::render_settings;
use crate::prompt::{confirm, secret, text};

/// Load settings for a rename run, offering interactive setup when the file
/// does not exist yet.
pub(crate) fn load_or_init(path: &Path, assume_yes: bool) -> CliResult<Settings> {
    if !path.exists() {
        if assume_yes || !io::stdin().is_terminal() {
            return Err(CliError::validation(format!(
                "configuration file {} not found; run `amr config init` first",
                path.display()
            )));
        }
        eprintln!(
            "No configuration found at {}; answer a few questions to create it.",
            path.display()
        );
        let settings = prompt_settings()?;
        settings.validate().map_err(config_error)?;
        save(&settings, path, false).map_err(config_error)?;
    }
    load(path).map_err(config_error)
}

pub(crate) fn handle_config_init(path: &Path, args: &ConfigInitArgs) -> CliResult<()> {
    if path.exists() && !args.force {
        return Err(CliError::validation(format!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        )));
    }
    let settings = prompt_settings()?;
    settings.validate().map_err(config_error)?;
    save(&settings, path, args.force).map_err(config_error)?;
    println!("Configuration written to {}.", path.display());
    Ok(())
}

pub(crate) fn handle_config_show(path: &Path, format: OutputFormat) -> CliResult<()> {
    let settings = load(path).map_err(config_error)?;
    render_settings(&settings, format)
}

fn prompt_settings() -> CliResult<Settings> {
    let mut settings = Settings::default();
    settings.alist.url = text("Alist URL (e.g. https://alist.example.com)", "", false)?;
    settings.alist.guest_mode = confirm("Browse as guest without logging in?", false)?;
    if !settings.alist.guest_mode {
        settings.alist.user = text("Alist user", "", false)?;
        settings.alist.password = secret("Alist password", false)?;
        settings.alist.totp = text("TOTP secret (blank when two-factor login is off)", "", true)?;
        if !settings.alist.totp.is_empty() && !is_valid_secret(&settings.alist.totp) {
            return Err(CliError::validation("TOTP secret is not valid base32"));
        }
    }
    settings.tmdb.api_key = secret("TMDB API key", false)?;
    settings.tmdb.language = text("TMDB language", &settings.tmdb.language, false)?;
    Ok(settings)
}

/// User-fixable configuration problems are validation errors; the rest are
/// operational failures.
pub(crate) fn config_error(err: ConfigError) -> CliError {
    match err {
        ConfigError::MissingField { .. }
        | ConfigError::InvalidField { .. }
        | ConfigError::UnsupportedFormat { .. }
        | ConfigError::AlreadyExists { .. } => CliError::validation(err.to_string()),
        other => CliError::failure(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use anyhow::Result;

    const MINIMAL: &str = "\
alist:
  url: http://127.0.0.1:5244
  user: admin
  password: secret
tmdb:
  api_key: key
";

    #[test]
    fn missing_file_without_a_terminal_is_a_validation_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        let result = load_or_init(&path, true);
        assert!(matches!(result, Err(CliError::Validation(message)) if message.contains("amr config init")));
        Ok(())
    }

    #[test]
    fn existing_files_load_and_show() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, MINIMAL)?;

        let settings = load_or_init(&path, true).map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(settings.alist.user, "admin");
        assert!(handle_config_show(&path, OutputFormat::Json).is_ok());
        Ok(())
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, MINIMAL)?;
        let result = handle_config_init(&path, &ConfigInitArgs { force: false });
        assert!(matches!(result, Err(CliError::Validation(_))));
        Ok(())
    }

    #[test]
    fn invalid_settings_map_to_validation_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "alist:\n  url: http://127.0.0.1:5244\n")?;
        assert!(matches!(
            handle_config_show(&path, OutputFormat::Table),
            Err(CliError::Validation(_))
        ));

        fs::write(&path, "alist: [not, a, map]\n")?;
        let err = handle_config_show(&path, OutputFormat::Table);
        assert!(matches!(err, Err(CliError::Failure(_))));
        Ok(())
    }
}

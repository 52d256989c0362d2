use amr_config::{ConfigError, Settings, load, load_unvalidated, save};
use anyhow::Result;
use tempfile::tempdir;

fn complete() -> Settings {
    let mut settings = Settings::default();
    settings.alist.url = "https://alist.example.com".to_string();
    settings.alist.user = "admin".to_string();
    settings.alist.password = "secret".to_string();
    settings.tmdb.api_key = "tmdb-key".to_string();
    settings.amr.rename_by_async = false;
    settings
}

#[test]
fn yaml_round_trip_preserves_settings() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("config.yaml");
    save(&complete(), &path, false)?;
    assert_eq!(load(&path)?, complete());
    Ok(())
}

#[test]
fn json_documents_load_with_defaults() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "alist": {"url": "http://nas:5244", "guest_mode": true},
            "tmdb": {"api_key": "k"},
            "amr": {"media_folder_rename": false}
        }"#,
    )?;
    let settings = load(&path)?;
    assert!(settings.alist.guest_mode);
    assert!(!settings.amr.media_folder_rename);
    assert_eq!(settings.tmdb.api_url, "https://api.themoviedb.org/3");
    assert_eq!(
        settings.amr.tv_name_format,
        "{name}-S{season:0>2}E{episode:0>2}.{title}"
    );
    Ok(())
}

#[test]
fn save_refuses_to_overwrite_without_permission() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    save(&complete(), &path, false)?;
    assert!(matches!(
        save(&complete(), &path, false),
        Err(ConfigError::AlreadyExists { .. })
    ));
    save(&complete(), &path, true)?;
    Ok(())
}

#[test]
fn invalid_documents_surface_validation_errors() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "alist:\n  url: http://nas:5244\n")?;

    assert!(load_unvalidated(&path).is_ok());
    assert!(matches!(
        load(&path),
        Err(ConfigError::MissingField {
            section: "alist",
            field: "user"
        })
    ));
    Ok(())
}

#[test]
fn unknown_keys_fail_parsing() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "alist:\n  url: http://nas:5244\n  token: abc\n")?;
    assert!(matches!(load(&path), Err(ConfigError::Yaml { .. })));
    Ok(())
}

#[test]
fn missing_files_report_io_errors() {
    let result = load(std::path::Path::new("/definitely/not/here/config.yaml"));
    assert!(matches!(result, Err(ConfigError::Io { operation: "read", .. })));
}

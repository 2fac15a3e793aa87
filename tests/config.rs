mod common;

use common::Result;
use pretty_assertions::assert_eq;
use tsoft_devtools::config::{Settings, Theme};

#[test]
fn saved_settings_load_back() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tsoft-devtools").join("settings.json");

    let settings = Settings {
        theme: Some(Theme::Dark),
        host: Some("10.0.0.5".into()),
        port: Some(9333),
        require_meta_tag: false,
    };
    settings.save(&path)?;

    assert_eq!(Settings::load(&path)?, settings);
    assert_eq!(Settings::load_or_default(Some(&path)).effective_theme(), Theme::Dark);
    Ok(())
}

#[test]
fn theme_is_stored_under_its_own_key() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"tsoft_devtools_theme":"light"}"#)?;

    let settings = Settings::load(&path)?;
    assert_eq!(settings.theme, Some(Theme::Light));
    assert!(settings.require_meta_tag);
    assert_eq!(settings.host, None);
    Ok(())
}

#[test]
fn missing_or_broken_file_gives_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.json");
    assert_eq!(Settings::load_or_default(Some(&missing)), Settings::default());
    assert_eq!(Settings::load_or_default(None), Settings::default());

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json")?;
    assert!(Settings::load(&broken).is_err());
    assert_eq!(Settings::load_or_default(Some(&broken)), Settings::default());
    Ok(())
}

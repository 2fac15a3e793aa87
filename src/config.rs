//! Persisted user settings.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::statics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Light during the day, dark otherwise.
    pub fn for_hour(hour: u32) -> Self {
        if (statics::LIGHT_THEME_FROM_HOUR..statics::LIGHT_THEME_UNTIL_HOUR).contains(&hour) {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn for_local_time() -> Self {
        Self::for_hour(chrono::Local::now().hour())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "tsoft_devtools_theme", skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub require_meta_tag: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: None,
            host: None,
            port: None,
            require_meta_tag: true,
        }
    }
}

impl Settings {
    /// `<config dir>/tsoft-devtools/settings.json`, if a config dir can be found.
    pub fn default_path() -> Option<PathBuf> {
        config_dir_from(
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
            std::env::var_os("APPDATA"),
        )
        .map(|dir| dir.join(statics::SETTINGS_DIR_NAME).join(statics::SETTINGS_FILE_NAME))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        serde_json::from_str(&text).with_context(|| format!("parsing settings {path:?}"))
    }

    /// Settings from `path`, or defaults when there is no file or it cannot be read.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
        }
        let text = serde_json::to_string_pretty(self).context("serializing settings")?;
        fs::write(path, text).with_context(|| format!("writing {path:?}"))?;
        tracing::debug!(?path, "settings saved");
        Ok(())
    }

    /// The stored theme, or the time-of-day default.
    pub fn effective_theme(&self) -> Theme {
        self.theme.unwrap_or_else(Theme::for_local_time)
    }
}

fn config_dir_from(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
    appdata: Option<OsString>,
) -> Option<PathBuf> {
    let non_empty = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);
    non_empty(xdg_config_home)
        .or_else(|| non_empty(home).map(|h| h.join(".config")))
        .or_else(|| non_empty(appdata))
}

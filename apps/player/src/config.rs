use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use player_core::DisplayDensity;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display_density: f32,
    /// SQLite url for the preference store; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub log_filter: String,
    pub lesson_script: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_density: 1.0,
            database_url: None,
            log_filter: "info".into(),
            lesson_script: None,
        }
    }
}

impl Settings {
    pub fn density(&self) -> anyhow::Result<DisplayDensity> {
        DisplayDensity::new(self.display_density).ok_or_else(|| {
            anyhow!(
                "display_density must be a positive number, got {}",
                self.display_density
            )
        })
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let raw = fs::read_to_string(path).ok();
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment overrides.
fn settings_from(raw_file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = match raw_file.map(toml::from_str::<Settings>) {
        Some(Ok(file_cfg)) => file_cfg,
        Some(Err(err)) => {
            tracing::warn!("ignoring unreadable player config: {err}");
            Settings::default()
        }
        None => Settings::default(),
    };

    for key in ["PLAYER_DISPLAY_DENSITY", "APP__DISPLAY_DENSITY"] {
        if let Some(v) = env(key) {
            match v.parse::<f32>() {
                Ok(parsed) => settings.display_density = parsed,
                Err(_) => tracing::warn!("ignoring non-numeric {key}={v}"),
            }
        }
    }

    for key in ["PLAYER_DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = env(key) {
            settings.database_url = (!v.trim().is_empty()).then_some(v);
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("PLAYER_LESSON_SCRIPT") {
        settings.lesson_script = (!v.trim().is_empty()).then(|| PathBuf::from(v));
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

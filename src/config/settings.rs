//! Application settings for the fluent-panel binary
//!
//! Stored as JSON under the platform config directory. Missing fields fall
//! back to defaults, environment variables override the file, and loaded
//! values are clamped to sane ranges.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::controls::WindowConfig;
use crate::constants::{config, storage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Namespace for config slots inside the store
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Directory of the file-backed store; platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Option identifiers never written to config slots
    #[serde(default)]
    pub ignore_indexes: Vec<String>,

    /// Leave theme controls out of config slots
    #[serde(default)]
    pub ignore_theme_settings: bool,

    #[serde(default = "default_window")]
    pub window: WindowConfig,
}

fn default_folder() -> String {
    storage::DEFAULT_FOLDER.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_window() -> WindowConfig {
    WindowConfig::new("Fluent Panel")
        .sub_title("control binding demo")
        .minimize_key("F8")
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            store_dir: None,
            log_level: default_log_level(),
            ignore_indexes: Vec::new(),
            ignore_theme_settings: false,
            window: default_window(),
        }
    }
}

impl AppSettings {
    pub fn path() -> PathBuf {
        let mut path = app_dir();
        path.push(config::FILENAME);
        path
    }

    /// Load settings from the default path, writing defaults if absent
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::path())?;
        settings.apply_env_overrides();
        settings.validate_and_clamp();
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = ?path, "Settings file not found, creating defaults");
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;

        info!(path = ?path, folder = %settings.folder, "Loaded settings");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!(path = ?path, "Saved settings");
        Ok(())
    }

    /// Directory the file store lives in
    pub fn resolved_store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            let mut path = app_dir();
            path.push(config::STORE_DIR);
            path
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(folder) = env::var("FLUENT_PANEL_FOLDER")
            && !folder.trim().is_empty()
        {
            info!(folder = %folder, "Using store folder from FLUENT_PANEL_FOLDER");
            self.folder = folder;
        }
        if let Ok(dir) = env::var("FLUENT_PANEL_STORE_DIR")
            && !dir.trim().is_empty()
        {
            info!(store_dir = %dir, "Using store directory from FLUENT_PANEL_STORE_DIR");
            self.store_dir = Some(PathBuf::from(dir));
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Clamp loaded values to usable ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.folder.trim().is_empty() || self.folder.contains("..") {
            warn!(folder = %self.folder, using = storage::DEFAULT_FOLDER, "Invalid store folder, using default");
            self.folder = default_folder();
        }

        let (width, height) = self.window.size;
        let clamped = (
            width.clamp(MIN_WINDOW_WIDTH, MAX_WINDOW_WIDTH),
            height.clamp(MIN_WINDOW_HEIGHT, MAX_WINDOW_HEIGHT),
        );
        if clamped != (width, height) {
            warn!(width, height, clamped_width = clamped.0, clamped_height = clamped.1, "Window size out of range, clamping");
            self.window.size = clamped;
        }

        let tab_width = self.window.tab_width.clamp(MIN_TAB_WIDTH, MAX_TAB_WIDTH);
        if tab_width != self.window.tab_width {
            warn!(tab_width = self.window.tab_width, clamped = tab_width, "Tab width out of range, clamping");
            self.window.tab_width = tab_width;
        }
    }
}

fn app_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(config::APP_DIR);
    path
}

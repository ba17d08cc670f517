//! Persistent settings: reader preferences and viewer tuning in `settings.toml`.
//!
//! The reader preferences are stored as the boolean keys
//! `left_to_right_enabled` and `landscape_mode_enabled`. Every setter on
//! [`SettingsStore`] writes through to disk.

use crate::error::Result;
use crate::spread::{PageLayout, ReadingDirection};
use crate::zoom::{DEFAULT_DOUBLE_TAP_MULTIPLIER, DEFAULT_MAX_ZOOM_MULTIPLIER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "Minima";

/// Reading direction and page layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    left_to_right_enabled: bool,
    /// Double page spreads
    landscape_mode_enabled: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            left_to_right_enabled: true,
            landscape_mode_enabled: false,
        }
    }
}

impl ReaderSettings {
    pub fn new(direction: ReadingDirection, layout: PageLayout) -> Self {
        let mut settings = Self::default();
        settings.set_reading_direction(direction);
        settings.set_page_layout(layout);
        settings
    }

    pub fn reading_direction(&self) -> ReadingDirection {
        if self.left_to_right_enabled {
            ReadingDirection::LeftToRight
        } else {
            ReadingDirection::RightToLeft
        }
    }

    pub fn set_reading_direction(&mut self, direction: ReadingDirection) {
        self.left_to_right_enabled = direction == ReadingDirection::LeftToRight;
    }

    pub fn page_layout(&self) -> PageLayout {
        if self.landscape_mode_enabled {
            PageLayout::Double
        } else {
            PageLayout::Single
        }
    }

    pub fn set_page_layout(&mut self, layout: PageLayout) {
        self.landscape_mode_enabled = layout == PageLayout::Double;
    }
}

/// Tuning values for rendering and zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub initial_window_width: f32,
    pub initial_window_height: f32,
    /// Width pages are rasterized at
    pub render_width: u32,
    /// Pages are never rasterized narrower than this
    pub min_render_width: u32,
    pub max_zoom_multiplier: f32,
    pub double_tap_multiplier: f32,
    /// Zoom factor per wheel line
    pub wheel_zoom_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_window_width: 800.0,
            initial_window_height: 1000.0,
            render_width: 1080,
            min_render_width: 800,
            max_zoom_multiplier: DEFAULT_MAX_ZOOM_MULTIPLIER,
            double_tap_multiplier: DEFAULT_DOUBLE_TAP_MULTIPLIER,
            wheel_zoom_step: 1.1,
        }
    }
}

impl ViewerConfig {
    /// Width passed to the PDF engine
    pub fn effective_render_width(&self) -> u32 {
        self.render_width.max(self.min_render_width)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderSettings,
    pub viewer: ViewerConfig,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Reads a settings file. A malformed file falls back to defaults.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!("Ignoring invalid settings file {}: {}", path.display(), err);
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Settings bound to a file on disk
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    config: Config,
}

impl SettingsStore {
    /// Opens the store at the platform config directory
    pub fn open_default() -> Self {
        match default_config_path() {
            Some(path) => Self::open(path),
            None => Self::in_memory(Config::default()),
        }
    }

    /// Opens the store at `path`. A missing or unreadable file yields defaults.
    pub fn open(path: PathBuf) -> Self {
        let config = if path.exists() {
            load_from_path(&path).unwrap_or_else(|err| {
                tracing::warn!("Could not read settings from {}: {}", path.display(), err);
                Config::default()
            })
        } else {
            Config::default()
        };
        Self {
            path: Some(path),
            config,
        }
    }

    /// A store that never touches the disk
    pub fn in_memory(config: Config) -> Self {
        Self { path: None, config }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn reader(&self) -> ReaderSettings {
        self.config.reader
    }

    pub fn viewer(&self) -> &ViewerConfig {
        &self.config.viewer
    }

    pub fn reading_direction(&self) -> ReadingDirection {
        self.config.reader.reading_direction()
    }

    pub fn set_reading_direction(&mut self, direction: ReadingDirection) -> Result<()> {
        self.config.reader.set_reading_direction(direction);
        self.persist()
    }

    pub fn page_layout(&self) -> PageLayout {
        self.config.reader.page_layout()
    }

    pub fn set_page_layout(&mut self, layout: PageLayout) -> Result<()> {
        self.config.reader.set_page_layout(layout);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_to_path(&self.config, path),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_left_to_right_single_page() {
        let settings = ReaderSettings::default();
        assert_eq!(settings.reading_direction(), ReadingDirection::LeftToRight);
        assert_eq!(settings.page_layout(), PageLayout::Single);
    }

    #[test]
    fn reader_settings_use_boolean_keys() {
        let config = Config {
            reader: ReaderSettings::new(ReadingDirection::RightToLeft, PageLayout::Double),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).expect("serialize");
        assert!(text.contains("left_to_right_enabled = false"));
        assert!(text.contains("landscape_mode_enabled = true"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("nested").join(CONFIG_FILE);
        let mut config = Config::default();
        config.reader.set_page_layout(PageLayout::Double);
        config.viewer.max_zoom_multiplier = 5.0;

        save_to_path(&config, &path).expect("failed to save config");
        let loaded = load_from_path(&path).expect("failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "[reader]\nleft_to_right_enabled = false\n").expect("write");

        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded.reader.reading_direction(), ReadingDirection::RightToLeft);
        assert_eq!(loaded.reader.page_layout(), PageLayout::Single);
        assert_eq!(loaded.viewer, ViewerConfig::default());
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "not = valid = toml").expect("write");

        let loaded = load_from_path(&path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn store_setters_write_through() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);

        let mut store = SettingsStore::open(path.clone());
        assert_eq!(store.page_layout(), PageLayout::Single);
        store
            .set_reading_direction(ReadingDirection::RightToLeft)
            .expect("persist direction");
        store
            .set_page_layout(PageLayout::Double)
            .expect("persist layout");

        let reopened = SettingsStore::open(path);
        assert_eq!(reopened.reading_direction(), ReadingDirection::RightToLeft);
        assert_eq!(reopened.page_layout(), PageLayout::Double);
    }

    #[test]
    fn render_width_never_drops_below_minimum() {
        let viewer = ViewerConfig {
            render_width: 320,
            ..ViewerConfig::default()
        };
        assert_eq!(viewer.effective_render_width(), 800);
    }
}

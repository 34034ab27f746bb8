use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::layout::COMPACT_MAX_WIDTH;
use crate::search::{JumpPolicy, MAX_RESULTS, MIN_QUERY_LEN, SearchSettings};

const CONFIG_FILE_NAME: &str = "cour1786.conf";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataConfig {
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("assets/data.json") }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    /// Zoom used when jumping to a place
    pub focus_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        // Château de Versailles
        Self { center_lat: 48.80452438239178, center_lon: 2.1215883760563514, zoom: 9.0, focus_zoom: 12.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineConfig {
    pub base_interval_ms: u64,
    pub enabled: bool,
    pub history: bool,
    pub speed: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { base_interval_ms: 1200, enabled: false, history: false, speed: 1 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub min_query_len: usize,
    pub max_results: usize,
    #[serde(default)]
    pub jump_policy: JumpPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_len: MIN_QUERY_LEN, max_results: MAX_RESULTS, jump_policy: JumpPolicy::default() }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub compact_max_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { compact_max_width: COMPACT_MAX_WIDTH }
    }
}

// --- GUI Config ---
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuiConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font_scale: Option<f32>,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self { width: Some(1280), height: Some(800), font_scale: Some(1.0) }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub gui: GuiConfig,
}

const SECTIONS: [&str; 6] = ["data", "map", "timeline", "search", "layout", "gui"];

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io { path: path.to_path_buf(), source }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| Error::Config("No config dir found".into()))?;
        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Reads the config, creating it with defaults when absent and writing
    /// back sections that an older file lacks.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file does not exist, creating new one at {:?}", path);
            let cfg = Config::default();
            cfg.write(path)?;
            return Ok(cfg);
        }

        log::debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path).map_err(io_err(path))?;
        let cfg: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))?;

        let raw: toml::Table = toml::from_str(&content).unwrap_or_default();
        let missing: Vec<&str> = SECTIONS.iter().copied().filter(|s| !raw.contains_key(*s)).collect();
        if !missing.is_empty() {
            log::debug!("Writing back defaults for missing sections {:?}", missing);
            cfg.write(path)?;
        }
        Ok(cfg)
    }

    fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        let toml_str = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, toml_str).map_err(io_err(path))
    }

    /// Saves the window geometry back, leaving the other sections as they are on disk.
    pub fn save_gui_config(path: &Path, gui: &GuiConfig) -> Result<()> {
        if !path.exists() {
            log::warn!("Config file does not exist at {:?}", path);
            return Ok(());
        }
        let content = fs::read_to_string(path).map_err(io_err(path))?;
        let mut cfg: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.gui = gui.clone();
        cfg.write(path)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            min_query_len: self.search.min_query_len,
            max_results: self.search.max_results,
            jump_policy: self.search.jump_policy,
        }
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.timeline.base_interval_ms.max(1))
    }
}

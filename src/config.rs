//! Runtime configuration.
//!
//! Defaults are overlaid by an optional JSON file in the user's config directory,
//! then by environment variables:
//! - `AGILE_MAP_PROVIDER_URL` - Data provider base URL (default: `http://localhost:8080/api/agile`)
//! - `AGILE_MAP_HOST_URL` - Render host bridge URL (unset: no host)
//! - `AGILE_MAP_X_SPACING`, `AGILE_MAP_Y_SPACING`, `AGILE_MAP_Z_OFFSET` - Placement offsets
//! - `AGILE_MAP_ITERATION_LABELS` - `name` or `start-date`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::attributes::IterationLabelMode;

const APP_NAME: &str = "agile-map";
const CONFIG_FILE: &str = "config.json";

/// Default URL of a locally running data provider.
pub const DEFAULT_PROVIDER_URL: &str = "http://localhost:8080/api/agile";

/// Placement constants for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between sibling slots (left/right).
    pub x_spacing: f64,
    /// Vertical distance between levels (up/down).
    pub y_spacing: f64,
    /// Distance of the map plane in front of the origin (in/out).
    pub z_offset: f64,
    pub node_size: f64,
    pub iteration_labels: IterationLabelMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_spacing: 0.300,
            y_spacing: 0.420,
            z_offset: 0.300,
            node_size: 7.0,
            iteration_labels: IterationLabelMode::Name,
        }
    }
}

/// Convert a 0..=1000 slider position into a spacing, rounded to hundredths.
pub fn spacing_from_slider(value: u32) -> f64 {
    (f64::from(value) * 0.001 * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider_url: String,
    pub host_url: Option<String>,
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            host_url: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let mut config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Unparseable numbers are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AGILE_MAP_PROVIDER_URL") {
            self.provider_url = url;
        }
        if let Some(url) = lookup("AGILE_MAP_HOST_URL") {
            self.host_url = Some(url).filter(|u| !u.is_empty());
        }

        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());
        if let Some(x) = number("AGILE_MAP_X_SPACING") {
            self.layout.x_spacing = x;
        }
        if let Some(y) = number("AGILE_MAP_Y_SPACING") {
            self.layout.y_spacing = y;
        }
        if let Some(z) = number("AGILE_MAP_Z_OFFSET") {
            self.layout.z_offset = z;
        }

        if let Some(mode) = lookup("AGILE_MAP_ITERATION_LABELS") {
            match mode.parse::<IterationLabelMode>() {
                Ok(mode) => self.layout.iteration_labels = mode,
                Err(e) => tracing::warn!("{}", e),
            }
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_placement_offsets() {
        let config = Config::default();
        assert_eq!(config.layout.x_spacing, 0.300);
        assert_eq!(config.layout.y_spacing, 0.420);
        assert_eq!(config.layout.z_offset, 0.300);
        assert!(config.host_url.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("AGILE_MAP_HOST_URL", "http://127.0.0.1:9000"),
            ("AGILE_MAP_X_SPACING", "0.5"),
            ("AGILE_MAP_Y_SPACING", "not-a-number"),
            ("AGILE_MAP_ITERATION_LABELS", "start-date"),
        ]));

        assert_eq!(config.host_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.layout.x_spacing, 0.5);
        assert_eq!(config.layout.y_spacing, 0.420);
        assert_eq!(config.layout.iteration_labels, IterationLabelMode::StartDate);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"host_url": "http://vr.local", "layout": {"x_spacing": 0.25}}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.host_url.as_deref(), Some("http://vr.local"));
        assert_eq!(config.layout.x_spacing, 0.25);
        assert_eq!(config.layout.y_spacing, 0.420);
        assert_eq!(config.provider_url, DEFAULT_PROVIDER_URL);
    }

    #[test]
    fn slider_positions_round_to_hundredths() {
        assert_eq!(spacing_from_slider(300), 0.3);
        assert_eq!(spacing_from_slider(306), 0.31);
        assert_eq!(spacing_from_slider(0), 0.0);
    }
}

//! Configuration file handling.
//!
//! Settings come from `cdi-dashboard.toml` (or the file named by
//! `--config`), then command-line arguments override them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::data::filter::MetricKind;

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cdi-dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    /// Initial filter selections.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub window: WindowConfig,
}

/// Data source settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Indicator table loaded at start-up.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Filter selections applied when a dataset is first loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub metric: MetricKind,

    /// Disease drop-down label, e.g. "Diabetes (Prevalence)".
    #[serde(default = "default_disease")]
    pub disease: Option<String>,

    /// Treemap year; the earliest year in the data when unset.
    #[serde(default)]
    pub year: Option<String>,

    /// Region filter for the stacked and bar charts; all regions when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Line chart multi-select.
    #[serde(default = "default_lines")]
    pub lines: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::default(),
            disease: default_disease(),
            year: None,
            region: None,
            lines: default_lines(),
        }
    }
}

fn default_disease() -> Option<String> {
    Some("Diabetes (Prevalence)".to_string())
}

fn default_lines() -> Vec<String> {
    vec!["Male".to_string(), "Female".to_string()]
}

/// Native window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: f32,

    #[serde(default = "default_height")]
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> f32 {
    1400.0
}

fn default_height() -> f32 {
    900.0
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the effective configuration for a run.
    ///
    /// An explicit `--config` must load; a broken default file only warns.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => match Self::load_default() {
                Ok(found) => found.unwrap_or_default(),
                Err(e) => {
                    log::warn!("Ignoring {DEFAULT_CONFIG_FILE}: {e:#}");
                    Config::default()
                }
            },
        };
        config.merge_with_args(args);
        Ok(config)
    }

    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(path) = &args.data {
            self.data.path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.metric, MetricKind::Prevalence);
        assert_eq!(config.defaults.disease.as_deref(), Some("Diabetes (Prevalence)"));
        assert_eq!(config.defaults.lines, vec!["Male", "Female"]);
        assert_eq!(config.window.width, 1400.0);
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[data]
path = "data/indicators.csv"

[defaults]
metric = "MortalityRate"
disease = "Stroke (Mortality Rate)"
year = "2016"
lines = ["U.S. Regions"]

[window]
width = 1024.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.path, Some(PathBuf::from("data/indicators.csv")));
        assert_eq!(config.defaults.metric, MetricKind::MortalityRate);
        assert_eq!(config.defaults.year.as_deref(), Some("2016"));
        assert_eq!(config.defaults.lines, vec!["U.S. Regions"]);
        assert_eq!(config.window.width, 1024.0);
        assert_eq!(config.window.height, 900.0);
    }

    #[test]
    fn test_cli_data_overrides_file() {
        let mut config: Config = toml::from_str("[data]\npath = \"a.csv\"").unwrap();
        let args = Args {
            data: Some(PathBuf::from("b.csv")),
            config: None,
            verbose: false,
        };
        config.merge_with_args(&args);
        assert_eq!(config.data.path, Some(PathBuf::from("b.csv")));
    }
}

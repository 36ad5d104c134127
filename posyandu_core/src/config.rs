//! Configuration file support for the Posyandu growth monitor.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/posyandu/config.toml`.
//! It only controls exports and statistics; records are never written here.

use crate::export::{CSV_FILENAME, REPORT_FILENAME};
use crate::stats::DEFAULT_RECENT_WINDOW_DAYS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

/// Export destination configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_csv_filename")]
    pub csv_filename: String,

    #[serde(default = "default_report_filename")]
    pub report_filename: String,

    /// Hand the report to the default viewer for printing after writing it
    #[serde(default = "default_open_report")]
    pub open_report: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            csv_filename: default_csv_filename(),
            report_filename: default_report_filename(),
            open_report: default_open_report(),
        }
    }
}

impl ExportConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_filename)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_filename)
    }
}

/// Dashboard statistics configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: default_recent_window_days(),
        }
    }
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_csv_filename() -> String {
    CSV_FILENAME.into()
}

fn default_report_filename() -> String {
    REPORT_FILENAME.into()
}

fn default_open_report() -> bool {
    true
}

fn default_recent_window_days() -> i64 {
    DEFAULT_RECENT_WINDOW_DAYS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    Error::Config("HOME environment variable not set".into())
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("posyandu").join("config.toml"))
    }

    /// Reject values that would make exports or statistics meaningless
    pub fn validate(&self) -> Result<()> {
        if self.export.csv_filename.trim().is_empty() {
            return Err(Error::Config("export.csv_filename must not be empty".into()));
        }
        if self.export.report_filename.trim().is_empty() {
            return Err(Error::Config(
                "export.report_filename must not be empty".into(),
            ));
        }
        if self.stats.recent_window_days <= 0 {
            return Err(Error::Config(
                "stats.recent_window_days must be positive".into(),
            ));
        }
        Ok(())
    }
}

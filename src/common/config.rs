use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::common::errors::DedupError;
use crate::duplicates::scanner::{EngineConfig, DEFAULT_EXTENSIONS, DEFAULT_THRESHOLD};

/// Global imgdedup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Maximum perceptual distance for two images to count as similar
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Report deletions without touching the filesystem
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Image extensions to scan (lower-case, no dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Worker threads for hashing (0 = one per core)
    #[serde(default)]
    pub workers: usize,

    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}
fn default_dry_run() -> bool {
    true
}
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            dry_run: default_dry_run(),
            extensions: default_extensions(),
            workers: 0,
            output_format: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Get the imgdedup data directory (~/.imgdedup)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".imgdedup")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load config from file, or fall back to defaults if not present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents).map_err(|e| DedupError::Config {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Apply a `key = value` update coming from the command line
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "threshold" => self.threshold = value.parse()?,
            "dry_run" => self.dry_run = value.parse()?,
            "workers" => self.workers = value.parse()?,
            "extensions" => {
                self.extensions = value
                    .split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            }
            "output_format" => {
                self.output_format = match value {
                    "human" => OutputFormat::Human,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    other => anyhow::bail!("Unknown output format: {}", other),
                }
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Build the engine configuration the scanner and mutation manager consume
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            threshold: self.threshold,
            dry_run: self.dry_run,
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect::<BTreeSet<_>>(),
            workers: self.workers,
        }
    }
}

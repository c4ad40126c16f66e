//! Configuration management for the hifilm CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use hifilm::{DecodeConfig, WeaponTable};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weapon table layered over the built-in one.
    pub weapon_table: Option<PathBuf>,
    /// Timestamp field offsets relative to the first marker byte.
    pub timestamp_offsets: Option<Vec<usize>>,
    /// Kill/death pairing tolerance in milliseconds.
    pub pair_tolerance_ms: Option<u64>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("hifilm");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Build a decoder configuration from saved defaults plus one-shot
    /// command line overrides.
    pub fn decode_config(&self, weapons_override: Option<&Path>) -> Result<DecodeConfig> {
        let mut config = DecodeConfig::default();

        let weapons = weapons_override.or(self.weapon_table.as_deref());
        if let Some(path) = weapons {
            config.weapon_table = WeaponTable::load_over_builtin(path)
                .with_context(|| format!("Failed to load weapon table {}", path.display()))?;
        }

        if let Some(offsets) = &self.timestamp_offsets {
            if !offsets.is_empty() {
                config.timestamp_offsets = offsets.clone();
            }
        }

        if let Some(tolerance) = self.pair_tolerance_ms {
            config.pair_tolerance_ms = tolerance;
        }

        Ok(config)
    }
}

/// Parse a comma-separated offset list like "5" or "3,5,8".
pub fn parse_offsets(value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("Invalid timestamp offset {s:?}"))
        })
        .collect()
}

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::params::{Defaults, Params};

/// Top-level configuration stored on disk.
///
/// Holds the default request parameters the CLI applies on every run. All
/// fields are optional; whatever is absent falls back to the library
/// defaults when converted with [`Config::to_defaults`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Response format requested from the service, e.g. "json" or "kml".
    pub format: Option<String>,

    /// Gazetteer searched by default, e.g. "unlock", "os" or
    /// "naturalearth".
    pub gazetteer: Option<String>,

    /// Restrict results to a single feature type.
    pub feature_type: Option<String>,

    /// Extra query parameters sent with every request.
    ///
    /// Example TOML:
    /// [params]
    /// maxRows = "20"
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Config {
    /// Convert to a client defaults record; missing `format`/`gazetteer`
    /// values are back-filled by the record itself.
    pub fn to_defaults(&self) -> Defaults {
        let mut partial = Params::new();

        if let Some(format) = &self.format {
            partial.insert("format", format.as_str());
        }
        if let Some(gazetteer) = &self.gazetteer {
            partial.insert("gazetteer", gazetteer.as_str());
        }
        if let Some(feature_type) = &self.feature_type {
            partial.insert("featureType", feature_type.as_str());
        }
        for (key, value) in &self.params {
            partial.insert(key.as_str(), value.as_str());
        }

        Defaults::from_params(partial)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("uk", "edina", "unlock-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::providers::fast_forex::DEFAULT_BASE_URL;

/// Read from the working directory unless `--config-path` says otherwise.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_history_file() -> PathBuf {
    PathBuf::from("conversions.json")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The API credential. Callers check this before any cache or network
    /// activity so a misconfigured run stops without side effects.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => anyhow::bail!(
                "no `api_key` entry in the configuration; add {{\"api_key\": \"...\"}} to it"
            ),
        }
    }
}

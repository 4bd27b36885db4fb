use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.exchangeratesapi.io";

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_target_currency() -> String {
    "EGP".to_string()
}

fn default_lookback_days() -> i64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange: Option<ExchangeProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange: Some(ExchangeProviderConfig {
                base_url: DEFAULT_API_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency converted from when --from is not given.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Currency converted to when --to is not given.
    #[serde(default = "default_target_currency")]
    pub target_currency: String,
    /// Days of history fetched for the rate chart.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            target_currency: default_target_currency(),
            lookback_days: default_lookback_days(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to
    /// built-in defaults when no config file exists.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxc", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

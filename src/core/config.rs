use crate::core::bitcoins::Bitcoins;
use crate::core::feed::Feed;
use crate::core::rates::Rates;
use crate::core::stocks::Stocks;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.hgbrasil.com";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HgFinanceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HgFinanceConfig {
    fn default() -> Self {
        HgFinanceConfig {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub hg_finance: HgFinanceConfig,
}

/// Field selectors sent to the finance endpoint, one per feed.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FieldsConfig {
    pub rates: String,
    pub bitcoins: String,
    pub stocks: String,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        FieldsConfig {
            rates: Rates::DEFAULT_FIELDS.to_string(),
            bitcoins: Bitcoins::DEFAULT_FIELDS.to_string(),
            stocks: Stocks::DEFAULT_FIELDS.to_string(),
        }
    }
}

/// Where fetched rows are kept between runs.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Disk,
    /// Nothing survives the process; offline runs have no fallback.
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
    pub data_path: Option<String>,
    #[serde(default)]
    pub store: StoreKind,
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "omouravictor", "ratesnow")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("br", "omouravictor", "ratesnow")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("store"))
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

// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::parser::page::DEFAULT_NAME_BOILERPLATE;
use crate::paths::AppPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_base_url() -> String {
    "https://rasp.tpu.ru".to_string()
}

fn default_user_agent() -> String {
    format!("raspical/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_name_boilerplate() -> Vec<String> {
    DEFAULT_NAME_BOILERPLATE
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overrides `{base_url}/data/encrypt/decrypt.html`.
    #[serde(default)]
    pub key_endpoint: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Pages fetched and parsed at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// 0 disables the response cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_name_boilerplate")]
    pub name_boilerplate: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_endpoint: None,
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            concurrency: default_concurrency(),
            cache_ttl_secs: default_cache_ttl_secs(),
            name_boilerplate: default_name_boilerplate(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Config file not found: {}",
                path.display()
            ));
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads from the standard per-user location.
    pub fn load_default_location() -> Result<Self> {
        let path = AppPaths::get_config_file_path()?;
        Self::load_or_default(&path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, toml_str)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn key_endpoint(&self) -> String {
        self.key_endpoint.clone().unwrap_or_else(|| {
            format!(
                "{}/data/encrypt/decrypt.html",
                self.base_url.trim_end_matches('/')
            )
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

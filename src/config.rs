use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str =
    "https://h5kyfx0mh2.execute-api.ap-southeast-2.amazonaws.com/dev";

pub const API_URL_ENV_VAR: &str = "SERVERSCOPE_API_URL";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_chart_width() -> usize {
    40
}
fn default_tick_rate_ms() -> u64 {
    250
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScopeConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_chart_width")]
    pub chart_width: usize, // widest bar in the text chart, in columns
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64, // dashboard poll interval
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            chart_width: default_chart_width(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl ScopeConfig {
    /// ~/.serverscope
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".serverscope"))
    }

    /// Load ~/.serverscope/config.toml, then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::home_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml"))?,
            None => Self::default(),
        };
        config.apply_env(std::env::var(API_URL_ENV_VAR).ok());
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;

        if config.api_base_url.trim().is_empty() {
            config.api_base_url = default_api_base_url();
        }
        if config.chart_width == 0 {
            config.chart_width = default_chart_width();
        }
        Ok(config)
    }

    /// Blank values are ignored.
    pub fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    pub fn with_api_url(mut self, api_url: Option<&String>) -> Self {
        self.apply_env(api_url.cloned());
        self
    }
}

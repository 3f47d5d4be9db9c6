use serde::Deserialize;
use std::path::{Path, PathBuf};

use reqwest::Url;
use tracing::warn;

use crate::error::{HarvestError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_QUERY: &str = "India Mandi News OR harvest OR crop insurance OR subsidy OR agriculture OR farmer OR farming OR government farmer OR crop harvest OR crop insurance OR subsidy";
/// Articles per page. Card geometry and the sentinel logic assume this.
pub const PAGE_SIZE: u32 = 6;

/// Host that refuses requests without a key; anything else is assumed to be a
/// proxy that injects the credential itself.
const KEYED_HOST: &str = "newsapi.org";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub endpoint: String,
    pub query: String,
    pub language: String,
    pub api_key_env: Option<String>,
    pub api_key_command: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: DEFAULT_QUERY.to_string(),
            language: "en".to_string(),
            api_key_env: Some("NEWSAPI_KEY".to_string()),
            api_key_command: None,
            timeout_secs: 10,
        }
    }
}

impl NewsConfig {
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            HarvestError::Config(format!("invalid endpoint {:?}: {}", self.endpoint, e))
        })
    }

    /// Whether the configured endpoint needs a key from us.
    pub fn requires_api_key(&self) -> bool {
        let Ok(url) = self.endpoint_url() else {
            return false;
        };
        url.host_str()
            .is_some_and(|host| host == KEYED_HOST || host.ends_with(&format!(".{}", KEYED_HOST)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// ~/.config/harvest (Linux) or ~/Library/Application Support/harvest (macOS)
pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("harvest"))
}

/// Default log file, under the state dir (Linux) or the cache dir.
pub fn default_log_path() -> Option<PathBuf> {
    let base = dirs::state_dir().or_else(dirs::cache_dir)?;
    Some(base.join("harvest").join("harvest.log"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load from an explicit path, or the default location. Falls back to
    /// defaults when the file is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default(),
            },
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Config::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| HarvestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.news.endpoint_url()?;
        if self.news.query.trim().is_empty() {
            return Err(HarvestError::Config("query must not be empty".into()));
        }
        Ok(())
    }
}

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_JWST_BASE_URL, DEFAULT_OSDR_BASE_URL,
    DEFAULT_OSDR_LIMIT, DEFAULT_PER_PAGE, DEFAULT_STATE_DIR, DEFAULT_USER_AGENT,
};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jwst: JwstConfig,
    pub osdr: OsdrConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
}

/// Image catalog upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwstConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub default_per_page: i64,
}

/// Dataset list upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OsdrConfig {
    pub base_url: String,
    pub list_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub state_dir: String,
}

impl Default for JwstConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_JWST_BASE_URL.to_string(),
            api_key: None,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Default for OsdrConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSDR_BASE_URL.to_string(),
            list_limit: DEFAULT_OSDR_LIMIT,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: DEFAULT_STATE_DIR.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load from a TOML file (defaults when it does not exist), then apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without consulting the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&config_content)?)
    }

    /// `JWST_HOST`, `JWST_API_KEY`, `RUST_BASE`, `HTTP_TIMEOUT_SECONDS`, `OSDR_LIST_LIMIT`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from any variable source; `lookup` returns `None` for unset names
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("JWST_HOST") {
            self.jwst.base_url = host;
        }
        if let Some(key) = lookup("JWST_API_KEY") {
            self.jwst.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Some(base) = lookup("RUST_BASE") {
            self.osdr.base_url = base;
        }
        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECONDS") {
            self.http.timeout_seconds = timeout.trim().parse().map_err(|_| {
                CatalogError::Config("HTTP_TIMEOUT_SECONDS must be a valid u64".to_string())
            })?;
        }
        if let Some(limit) = lookup("OSDR_LIST_LIMIT") {
            self.osdr.list_limit = limit.trim().parse().map_err(|_| {
                CatalogError::Config("OSDR_LIST_LIMIT must be a valid u32".to_string())
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("jwst.base_url", &self.jwst.base_url)?;
        validate_base_url("osdr.base_url", &self.osdr.base_url)?;
        if self.http.timeout_seconds == 0 {
            return Err(CatalogError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.osdr.list_limit == 0 {
            return Err(CatalogError::Config(
                "osdr.list_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_base_url(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Config(format!("{} cannot be empty", name)));
    }
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|e| CatalogError::Config(format!("{} is not a valid URL: {}", name, e)))
}

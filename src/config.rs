//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "OGAMBA_API_URL";
/// Environment variable overriding `auth.token`
pub const ENV_TOKEN: &str = "OGAMBA_TOKEN";
/// Environment variable overriding `api.dev_identity`
pub const ENV_DEV_IDENTITY: &str = "OGAMBA_DEV_IDENTITY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// REST endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value for the transitional identity header; omitted when unset
    #[serde(default)]
    pub dev_identity: Option<String>,
}

/// Where the bearer token comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: Option<String>,

    /// File rewritten by an external sign-in flow; wins over `token`
    #[serde(default)]
    pub token_file: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            dev_identity: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./ogamba.yaml (current directory)
    /// 3. ~/.config/ogamba/ogamba.yaml
    pub fn load(path: &str) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "ogamba.yaml".to_string(),
            shellexpand::tilde("~/.config/ogamba/ogamba.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Environment wins over the file; blank values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.auth.token = Some(token);
        }
        if let Some(identity) = lookup(ENV_DEV_IDENTITY) {
            self.api.dev_identity = Some(identity);
        }
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Get the token file path, expanding ~ to home directory
    pub fn token_file(&self) -> Option<PathBuf> {
        self.auth
            .token_file
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }
}

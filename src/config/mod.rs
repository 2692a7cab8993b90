use crate::SEARCH_ROUTE;
use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "~/.config/relevanssi/config.yaml";
const DEFAULT_DATABASE_PATH: &str = "~/.local/share/relevanssi/content.db";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible origin used when building pagination links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

/// Search and ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when `posts_per_page` is not supplied
    #[serde(default = "default_per_page")]
    pub default_per_page: i64,
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_body_weight")]
    pub content_weight: f64,
    #[serde(default = "default_body_weight")]
    pub excerpt_weight: f64,
    /// Skip the OR retry when an AND search finds nothing
    #[serde(default)]
    pub disable_or_fallback: bool,
    /// Word count of generated excerpts
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            title_weight: default_title_weight(),
            content_weight: default_body_weight(),
            excerpt_weight: default_body_weight(),
            disable_or_fallback: false,
            excerpt_length: default_excerpt_length(),
        }
    }
}

fn default_per_page() -> i64 {
    10
}

fn default_title_weight() -> f64 {
    5.0
}

fn default_body_weight() -> f64 {
    1.0
}

fn default_excerpt_length() -> usize {
    55
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite content database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

fn default_database_path() -> PathBuf {
    expand_path(DEFAULT_DATABASE_PATH)
}

impl Config {
    /// Load configuration from the default path, or defaults when it does not exist
    pub fn load() -> Result<Self, anyhow::Error> {
        let config_path = expand_path(DEFAULT_CONFIG_PATH);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("Configuration not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, anyhow::Error> {
        info!("Loading configuration from: {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration: {}", path.display()))?;

        config.database_path = expand_path(&config.database_path.to_string_lossy());

        Ok(config)
    }

    /// Absolute URL of the search endpoint, without a query string
    pub fn search_endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.server.public_url.trim_end_matches('/'),
            SEARCH_ROUTE
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

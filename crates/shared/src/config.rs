//! Configuration management for the catalog service.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `tmdb.api_key`
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Master list cache settings
    pub cache: CacheConfig,

    /// TMDB (movies) provider settings
    pub tmdb: TmdbConfig,

    /// Jikan (anime) provider settings
    pub jikan: JikanConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Master list expiration in seconds
    pub expiration_seconds: u64,

    /// Number of records fetched into each master list
    pub master_list_size: usize,
}

/// TMDB provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// TMDB API base URL
    pub base_url: String,

    /// TMDB API key (overridden by the TMDB_API_KEY environment variable)
    pub api_key: String,

    /// Prefix joined with `poster_path` to build poster URLs
    pub image_base_url: String,

    /// Response language
    pub language: String,

    /// Hard ceiling on pages requested per master fetch
    pub max_pages: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Jikan provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Hard ceiling on pages requested per master fetch
    pub max_pages: u32,

    /// Pause between consecutive page requests in milliseconds
    pub page_delay_ms: u64,

    /// Delay before the single retry after an HTTP 429, in milliseconds
    pub rate_limit_retry_delay_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration_seconds: 86_400,
            master_list_size: 300,
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            language: "en-US".to_string(),
            max_pages: 20,
            request_timeout_secs: 30,
        }
    }
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            max_pages: 15,
            page_delay_ms: 500,
            rate_limit_retry_delay_ms: 2000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Self {
        self.with_api_key_override(std::env::var(TMDB_API_KEY_ENV).ok())
    }

    /// Replace the TMDB API key when a non-blank override is given
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.tmdb.api_key = key.trim().to_string();
        }
        self
    }
}

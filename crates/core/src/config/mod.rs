//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LIFEBOAT_*)
//! 2. TOML config file (if LIFEBOAT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Engine configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LIFEBOAT_*)
/// 2. TOML config file (if LIFEBOAT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the application is served from. Responses whose final URL
    /// lands on a different origin are treated as opaque and never cached.
    ///
    /// Set via LIFEBOAT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite store database.
    ///
    /// Set via LIFEBOAT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Tag of the generation this build installs and serves from.
    ///
    /// Set via LIFEBOAT_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Optional manifest file; the built-in asset list is used when unset.
    ///
    /// Set via LIFEBOAT_MANIFEST_PATH environment variable.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via LIFEBOAT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether a freshly installed generation bypasses the waiting state
    /// and activates immediately.
    ///
    /// Set via LIFEBOAT_SKIP_WAITING environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Label glyph drawn on the synthesized image placeholder.
    ///
    /// Set via LIFEBOAT_FALLBACK_LABEL environment variable.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./lifeboat-store.sqlite")
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_user_agent() -> String {
    "lifeboat/0.1".into()
}

fn default_true() -> bool {
    true
}

fn default_fallback_label() -> String {
    "!".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            manifest_path: None,
            user_agent: default_user_agent(),
            skip_waiting: true,
            fallback_label: default_fallback_label(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LIFEBOAT_`
    /// 2. TOML file from `LIFEBOAT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LIFEBOAT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LIFEBOAT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TETHER_*)
//! 2. TOML config file (if TETHER_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! `cache_version` must change on every deployment: the worker names its
//! namespace after it and reaps every other namespace on activation.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (TETHER_*)
/// 2. TOML config file (if TETHER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cache generation tag for the current build.
    ///
    /// Set via TETHER_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Prefix prepended to the version to form the namespace name.
    ///
    /// Set via TETHER_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Origin the worker serves. Requests to other origins are cross-origin.
    ///
    /// Set via TETHER_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Paths fetched into the namespace at install time, in order.
    ///
    /// Set via TETHER_PRECACHE environment variable (array syntax, e.g.
    /// `["/", "/offline"]`).
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Document served to failed navigations with no cached page.
    ///
    /// Set via TETHER_OFFLINE_PATH environment variable.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Image served to failed static asset requests.
    ///
    /// Set via TETHER_FALLBACK_IMAGE_PATH environment variable.
    #[serde(default = "default_fallback_image_path")]
    pub fallback_image_path: String,

    /// Path to SQLite cache database.
    ///
    /// Set via TETHER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via TETHER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum body bytes accepted from the network per request.
    ///
    /// Set via TETHER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Transport timeout in milliseconds. Unset means no timeout.
    ///
    /// Set via TETHER_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_cache_prefix() -> String {
    "static-".into()
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_offline_path() -> String {
    "/offline".into()
}

fn default_fallback_image_path() -> String {
    "/static/web_light_rd_SI@1x.png".into()
}

fn default_precache() -> Vec<String> {
    vec![
        "/".into(),
        "/for-rent".into(),
        "/about".into(),
        "/contact".into(),
        default_offline_path(),
        "/manifest.webmanifest".into(),
        default_fallback_image_path(),
    ]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./tether-cache.sqlite")
}

fn default_user_agent() -> String {
    "tether/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_version: default_cache_version(),
            cache_prefix: default_cache_prefix(),
            origin: default_origin(),
            precache: default_precache(),
            offline_path: default_offline_path(),
            fallback_image_path: default_fallback_image_path(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    /// Name of the namespace that is live for this build.
    pub fn namespace_name(&self) -> String {
        format!("{}{}", self.cache_prefix, self.cache_version)
    }

    /// Transport timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TETHER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        Self::from_figment(figment.merge(
            Env::prefixed("TETHER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        ))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OVERCAST_*)
//! 2. TOML config file (if OVERCAST_CONFIG_FILE set)
//! 3. Built-in defaults

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
/// 1. Environment variables (OVERCAST_*)
/// 2. TOML config file (if OVERCAST_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    ///
    /// Set via OVERCAST_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL the core-asset manifest paths resolve against.
    ///
    /// Set via OVERCAST_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent string for outbound requests.
    ///
    /// Set via OVERCAST_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to accept per response body.
    ///
    /// Set via OVERCAST_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network fetch timeout in milliseconds.
    ///
    /// Set via OVERCAST_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Scheme identifier embedded in generation names.
    ///
    /// Set via OVERCAST_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version token embedded in generation names. Bumping this is the only
    /// supported way to retire all prior generations on next activation.
    ///
    /// Set via OVERCAST_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Core Asset Manifest: resource paths that must be present in a
    /// generation before it is eligible to become current.
    ///
    /// Set via OVERCAST_CORE_ASSETS environment variable (comma-separated).
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,

    /// Parallel fetches during installation seeding (1-16).
    ///
    /// Set via OVERCAST_SEED_CONCURRENCY environment variable.
    #[serde(default = "default_seed_concurrency")]
    pub seed_concurrency: u8,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./overcast-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_user_agent() -> String {
    "overcast/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_prefix() -> String {
    "overcast".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_core_assets() -> Vec<String> {
    vec!["/".into(), "/index.html".into(), "/manifest.json".into()]
}

fn default_seed_concurrency() -> u8 {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            core_assets: default_core_assets(),
            seed_concurrency: default_seed_concurrency(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The generation name this configuration serves,
    /// e.g. `overcast-v3` for prefix `overcast` and version 3.
    pub fn generation_name(&self) -> String {
        format!("{}-v{}", self.cache_prefix, self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OVERCAST_`
    /// 2. TOML file from `OVERCAST_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("OVERCAST_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OVERCAST_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

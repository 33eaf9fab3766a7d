//! Core configuration with layered loading.
//!
//! Uses figment to merge, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if PROMO_CONFIG_FILE set)
//! 3. Environment variables (PROMO_*)

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

use crate::cache::ttl::{DEFAULT_EVICTION_HEADROOM, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};

/// Default quiet period before a query change is dispatched, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Tuning knobs for caches and the search coordinator.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PROMO_*)
/// 2. TOML config file (if PROMO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lifetime of a query cache entry in milliseconds.
    ///
    /// Set via PROMO_CACHE_TTL_MS environment variable.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Maximum number of entries held by one query cache.
    ///
    /// Set via PROMO_CACHE_MAX_ENTRIES environment variable.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Free slots left below capacity after an oldest-first eviction.
    ///
    /// Set via PROMO_CACHE_EVICTION_HEADROOM environment variable.
    #[serde(default = "default_cache_eviction_headroom")]
    pub cache_eviction_headroom: usize,

    /// Quiet period before a query change triggers a fetch, in milliseconds.
    ///
    /// Set via PROMO_DEBOUNCE_MS environment variable.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Items requested per page.
    ///
    /// Set via PROMO_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_TTL.as_secs() * 1_000
}

fn default_cache_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_cache_eviction_headroom() -> usize {
    DEFAULT_EVICTION_HEADROOM
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_max_entries: default_cache_max_entries(),
            cache_eviction_headroom: default_cache_eviction_headroom(),
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Debounce window as a Duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
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

        if let Ok(config_path) = std::env::var("PROMO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PROMO_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

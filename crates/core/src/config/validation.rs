//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_ms` is 0 or exceeds 24 hours
    /// - `cache_max_entries` is 0
    /// - `cache_eviction_headroom` is not below `cache_max_entries`
    /// - `debounce_ms` exceeds 5 seconds
    /// - `page_size` is 0 or exceeds 100
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_ms".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_ttl_ms > 86_400_000 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_ms".into(),
                reason: "must not exceed 24 hours (86400000ms)".into(),
            });
        }

        if self.cache_max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_max_entries".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_eviction_headroom >= self.cache_max_entries {
            return Err(ConfigError::Invalid {
                field: "cache_eviction_headroom".into(),
                reason: "must be less than cache_max_entries".into(),
            });
        }

        if self.debounce_ms > 5_000 {
            return Err(ConfigError::Invalid {
                field: "debounce_ms".into(),
                reason: "must not exceed 5 seconds (5000ms)".into(),
            });
        }
        if self.debounce_ms == 0 {
            tracing::warn!("debounce_ms is 0; every query change will issue a fetch");
        }

        if self.page_size == 0 || self.page_size > 100 {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be between 1 and 100".into() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ttl_zero() {
        let config = AppConfig { cache_ttl_ms: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_ms"));
    }

    #[test]
    fn test_validate_ttl_exceeds_limit() {
        let config = AppConfig { cache_ttl_ms: 86_400_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_ms"));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = AppConfig { cache_max_entries: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_max_entries"));
    }

    #[test]
    fn test_validate_headroom_not_below_capacity() {
        let config = AppConfig { cache_max_entries: 10, cache_eviction_headroom: 10, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_eviction_headroom"));
    }

    #[test]
    fn test_validate_debounce_exceeds_limit() {
        let config = AppConfig { debounce_ms: 5_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "debounce_ms"));
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let config = AppConfig { page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "page_size"));

        let config = AppConfig { page_size: 101, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "page_size"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            cache_ttl_ms: 1,
            cache_max_entries: 1,
            cache_eviction_headroom: 0,
            debounce_ms: 0,
            page_size: 100,
        }; // minimum valid values
        assert!(config.validate().is_ok());
    }
}

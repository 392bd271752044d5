use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_PROCESSING_FLOOR_MS: u64 = 2000;
const DEFAULT_VERIFICATION_PREFIX: &str = "MA";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Application configuration.
///
/// Loaded from an optional `config/storefront.toml` plus `STOREFRONT_*`
/// environment variables; every field has a default so the crate works
/// with no configuration at all.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Minimum time the checkout Processing step is shown, in
    /// milliseconds. A UX floor, not a correctness mechanism; tests set
    /// it to 0.
    #[serde(default = "default_processing_floor_ms")]
    pub processing_floor_ms: u64,

    /// Two-letter prefix for order verification codes.
    #[serde(default = "default_verification_prefix")]
    pub verification_prefix: String,

    /// Display currency label. No multi-currency computation happens
    /// anywhere in this core.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of the domain event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_processing_floor_ms() -> u64 {
    DEFAULT_PROCESSING_FLOOR_MS
}

fn default_verification_prefix() -> String {
    DEFAULT_VERIFICATION_PREFIX.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            processing_floor_ms: default_processing_floor_ms(),
            verification_prefix: default_verification_prefix(),
            currency: default_currency(),
            log_level: default_log_level(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file and environment, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/storefront").required(false))
            .add_source(Environment::with_prefix("STOREFRONT"))
            .build()?;

        config.try_deserialize()
    }

    /// Config suitable for deterministic tests: no processing delay.
    pub fn for_tests() -> Self {
        Self {
            processing_floor_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.processing_floor_ms, 2000);
        assert_eq!(cfg.verification_prefix, "MA");
        assert_eq!(cfg.verification_prefix.len(), 2);
        assert!(cfg.event_buffer > 0);
    }

    #[test]
    fn test_config_has_no_delay() {
        assert_eq!(AppConfig::for_tests().processing_floor_ms, 0);
    }
}

//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters, and providing
//! clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;
use url::Url;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - A URL doesn't parse or a routing pattern doesn't compile
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

    validate_config(&config)?;

    info!(
        quote_page = %config.provider.quote_page_url,
        crumb_endpoint = %config.provider.crumb_url,
        timeout_ms = config.http.timeout_ms,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    for (name, value) in [
        ("quote_page_url", &config.provider.quote_page_url),
        ("crumb_url", &config.provider.crumb_url),
        ("cookie_cache_url", &config.provider.cookie_cache_url),
    ] {
        Url::parse(value).with_context(|| format!("provider.{name} is not a valid URL: {value}"))?;
    }

    for (name, pattern) in [
        (
            "consent_gateway_pattern",
            &config.provider.consent_gateway_pattern,
        ),
        (
            "collect_consent_pattern",
            &config.provider.collect_consent_pattern,
        ),
    ] {
        Regex::new(pattern)
            .with_context(|| format!("provider.{name} is not a valid pattern: {pattern}"))?;
    }

    anyhow::ensure!(
        !config.provider.user_agent.is_empty(),
        "provider.user_agent must not be empty"
    );
    anyhow::ensure!(
        config.http.timeout_ms > 0,
        "http.timeout_ms must be positive, got {}",
        config.http.timeout_ms
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.http.timeout_ms, 30_000);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_empty_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(
            config.provider.quote_page_url,
            "https://finance.yahoo.com/quote/AAPL"
        );
        assert_eq!(config.provider.consent_gateway_pattern, r"guce\.yahoo");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_single_field() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            quote_page_url = "https://finance.example.test/quote/MSFT"

            [http]
            timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(
            config.provider.quote_page_url,
            "https://finance.example.test/quote/MSFT"
        );
        assert_eq!(config.http.timeout_ms, 5000);
        // Untouched fields keep their defaults.
        assert_eq!(config.provider.collect_consent_pattern, "collectConsent");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let mut config = AppConfig::default();
        config.provider.crumb_url = "not a url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = AppConfig::default();
        config.provider.consent_gateway_pattern = "guce(".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config.http.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}

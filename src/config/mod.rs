//! Configuration Module - TOML-based Provider Configuration
//!
//! Loads configuration from `config.toml`. Every provider endpoint and
//! routing pattern is externalized here with defaults matching the
//! provider's current deployment - the consent-gateway and collect-consent
//! patterns are fragile coupling to an external, unversioned redirect
//! contract and are deliberately kept out of the core logic so they can be
//! updated independently when the provider changes hosts.

pub mod loader;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Service-level settings.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Provider endpoints and routing patterns.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            provider: ProviderConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Service identity and logging.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Provider endpoints and redirect-routing patterns.
///
/// Defaults target Yahoo Finance as currently deployed.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Quote page fetched to establish session cookies.
    #[serde(default = "default_quote_page_url")]
    pub quote_page_url: String,
    /// Lightweight token endpoint, callable once cookies are in place.
    #[serde(default = "default_crumb_url")]
    pub crumb_url: String,
    /// Synthetic URL the cached crumb cookie is stored under. Never
    /// fetched; it only keys the jar entry.
    #[serde(default = "default_cookie_cache_url")]
    pub cookie_cache_url: String,
    /// Pattern identifying a redirect into the consent gateway.
    #[serde(default = "default_consent_gateway_pattern")]
    pub consent_gateway_pattern: String,
    /// Pattern the consent landing redirect must match.
    #[serde(default = "default_collect_consent_pattern")]
    pub collect_consent_pattern: String,
    /// User agent sent to the token endpoint.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            quote_page_url: default_quote_page_url(),
            crumb_url: default_crumb_url(),
            cookie_cache_url: default_cookie_cache_url(),
            consent_gateway_pattern: default_consent_gateway_pattern(),
            collect_consent_pattern: default_collect_consent_pattern(),
            user_agent: default_user_agent(),
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quote_page_url() -> String {
    "https://finance.yahoo.com/quote/AAPL".to_string()
}

fn default_crumb_url() -> String {
    "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string()
}

fn default_cookie_cache_url() -> String {
    "http://config.yf2/".to_string()
}

fn default_consent_gateway_pattern() -> String {
    r"guce\.yahoo".to_string()
}

fn default_collect_consent_pattern() -> String {
    "collectConsent".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; yahoo-finance2/2.11.2)".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

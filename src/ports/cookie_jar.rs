//! Cookie Jar Port - URL-scoped Cookie Storage
//!
//! The core never holds cookies directly; it asks the jar for the cookies
//! (or the `Cookie` header string) valid for a URL, and hands raw
//! `set-cookie` headers back for storage. The trait is object-safe so the
//! orchestrator can hold it as `Arc<dyn CookieJar>`.

use async_trait::async_trait;

/// A cookie as the core sees it: name and value, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub key: String,
    pub value: String,
}

/// Trait for URL-keyed cookie storage.
///
/// Implementations own scoping (domain/path matching) and expiry. The
/// synthetic configuration URL used for the cached crumb goes through the
/// same interface as real provider URLs.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Cookies currently stored for `url`, in the order they were first
    /// recorded. With `check_expiry` set, expired cookies are omitted.
    async fn get_cookies(&self, url: &str, check_expiry: bool)
        -> anyhow::Result<Vec<CookiePair>>;

    /// The `Cookie` request-header string for `url` (`k=v; k2=v2`).
    async fn get_cookie_string(&self, url: &str) -> anyhow::Result<String>;

    /// Store every raw `set-cookie` header value, scoped to `url`.
    async fn set_from_headers(&self, headers: &[String], url: &str) -> anyhow::Result<()>;

    /// Store a single cookie under `url` (used for the synthetic crumb
    /// cache entry).
    async fn set_cookie(&self, key: &str, value: &str, url: &str) -> anyhow::Result<()>;
}

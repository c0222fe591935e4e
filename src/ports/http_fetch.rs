//! HTTP Fetch Port - Raw Transport Interface
//!
//! The crumb flow needs more from a response than a typical API client:
//! redirects must not be followed automatically, and the raw multi-valued
//! `set-cookie` headers must be readable (a single-value header accessor
//! loses cookies when the provider sets several at once).

use async_trait::async_trait;

use crate::domain::options::FetchOptions;

/// What the acquisition sequence reads off an HTTP response.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase, used in endpoint failure diagnostics.
    pub status_text: String,
    /// Response headers in arrival order, `set-cookie` excluded.
    pub headers: Vec<(String, String)>,
    /// Raw `set-cookie` header values, one entry per header line.
    pub set_cookie: Vec<String>,
    /// Full response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Look up a single-valued header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `Location` header, if the response is a redirect.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

/// Trait for executing a single HTTP exchange.
///
/// Implementors must never follow redirects: a 3xx response is returned
/// as-is with its `Location` header intact. Bodies are yielded as decoded
/// text regardless of any content encoding on the wire. Timeouts are the
/// implementor's concern; the core treats any transport error as fatal to
/// the current acquisition attempt.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform the request and collect status, headers, and body.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> anyhow::Result<FetchResponse>;
}

//! Memory Jar Adapter - In-process Cookie Store
//!
//! Implements the `CookieJar` port with an in-memory store. Parsing of
//! `set-cookie` headers (including Expires and Max-Age) comes from the
//! `cookie` crate; scoping follows the usual domain/path matching rules.
//! Insertion order is preserved so "the first cookie recorded for a URL"
//! is well defined. Nothing is persisted across process restarts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use cookie::Cookie;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::warn;
use url::Url;

use crate::ports::{CookieJar, CookiePair};

#[derive(Debug, Clone)]
struct StoredCookie {
    key: String,
    value: String,
    /// Cookie domain, lowercased, without a leading dot.
    domain: String,
    /// True when the Domain attribute was absent; the cookie then matches
    /// its exact host only.
    host_only: bool,
    path: String,
    expires: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn matches(&self, host: &str, path: &str) -> bool {
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            host == self.domain || host.ends_with(&format!(".{}", self.domain))
        };
        domain_ok && path_matches(&self.path, path)
    }

    fn expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == "/" || cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

/// In-memory, URL-scoped cookie jar.
#[derive(Default)]
pub struct MemoryJar {
    cookies: RwLock<Vec<StoredCookie>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn host_and_path(url: &str) -> Result<(String, String)> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid cookie URL: {url}"))?;
        let host = parsed
            .host_str()
            .with_context(|| format!("Cookie URL has no host: {url}"))?
            .to_ascii_lowercase();
        Ok((host, parsed.path().to_string()))
    }

    async fn matching(&self, url: &str, check_expiry: bool) -> Result<Vec<CookiePair>> {
        let (host, path) = Self::host_and_path(url)?;
        let now = OffsetDateTime::now_utc();

        let cookies = self.cookies.read().await;
        Ok(cookies
            .iter()
            .filter(|cookie| cookie.matches(&host, &path))
            .filter(|cookie| !check_expiry || !cookie.expired(now))
            .map(|cookie| CookiePair {
                key: cookie.key.clone(),
                value: cookie.value.clone(),
            })
            .collect())
    }

    async fn store(&self, incoming: StoredCookie) {
        let mut cookies = self.cookies.write().await;
        match cookies.iter_mut().find(|existing| {
            existing.key == incoming.key
                && existing.domain == incoming.domain
                && existing.path == incoming.path
        }) {
            // Replacement keeps the original insertion position.
            Some(existing) => *existing = incoming,
            None => cookies.push(incoming),
        }
    }
}

#[async_trait]
impl CookieJar for MemoryJar {
    async fn get_cookies(
        &self,
        url: &str,
        check_expiry: bool,
    ) -> Result<Vec<CookiePair>> {
        self.matching(url, check_expiry).await
    }

    async fn get_cookie_string(&self, url: &str) -> Result<String> {
        let pairs = self.matching(url, true).await?;
        Ok(pairs
            .iter()
            .map(|pair| format!("{}={}", pair.key, pair.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    async fn set_from_headers(&self, headers: &[String], url: &str) -> Result<()> {
        let (host, _) = Self::host_and_path(url)?;
        let now = OffsetDateTime::now_utc();

        for header in headers {
            let parsed = match Cookie::parse(header.as_str()) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(%error, header, "skipping unparseable set-cookie header");
                    continue;
                }
            };

            // Max-Age wins over Expires when both are present.
            let expires = parsed
                .max_age()
                .map(|age| now + age)
                .or_else(|| parsed.expires_datetime());

            let (domain, host_only) = match parsed.domain() {
                Some(domain) => (
                    domain.trim_start_matches('.').to_ascii_lowercase(),
                    false,
                ),
                None => (host.clone(), true),
            };

            self.store(StoredCookie {
                key: parsed.name().to_string(),
                value: parsed.value().to_string(),
                domain,
                host_only,
                path: parsed.path().unwrap_or("/").to_string(),
                expires,
            })
            .await;
        }

        Ok(())
    }

    async fn set_cookie(&self, key: &str, value: &str, url: &str) -> Result<()> {
        let (host, _) = Self::host_and_path(url)?;
        self.store(StoredCookie {
            key: key.to_string(),
            value: value.to_string(),
            domain: host,
            host_only: true,
            path: "/".to_string(),
            expires: None,
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE_URL: &str = "https://finance.yahoo.com/quote/AAPL";

    #[tokio::test]
    async fn test_set_and_read_back() {
        let jar = MemoryJar::new();
        jar.set_from_headers(
            &["A3=d=abc; Path=/; Domain=.yahoo.com".to_string()],
            QUOTE_URL,
        )
        .await
        .unwrap();

        let cookies = jar.get_cookies(QUOTE_URL, true).await.unwrap();
        assert_eq!(
            cookies,
            vec![CookiePair {
                key: "A3".to_string(),
                value: "d=abc".to_string(),
            }]
        );
        assert_eq!(
            jar.get_cookie_string(QUOTE_URL).await.unwrap(),
            "A3=d=abc"
        );
    }

    #[tokio::test]
    async fn test_domain_attribute_covers_subdomains() {
        let jar = MemoryJar::new();
        jar.set_from_headers(
            &["GUC=x; Domain=.yahoo.com; Path=/".to_string()],
            "https://guce.yahoo.com/consent",
        )
        .await
        .unwrap();

        // Visible on a sibling subdomain.
        assert_eq!(jar.get_cookies(QUOTE_URL, true).await.unwrap().len(), 1);
        // Not visible on an unrelated host.
        assert!(jar
            .get_cookies("https://example.net/", true)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_host_only_cookie_stays_on_its_host() {
        let jar = MemoryJar::new();
        jar.set_from_headers(&["sid=1".to_string()], QUOTE_URL)
            .await
            .unwrap();

        assert_eq!(jar.get_cookies(QUOTE_URL, true).await.unwrap().len(), 1);
        assert!(jar
            .get_cookies("https://query1.finance.yahoo.com/v1/test/getcrumb", true)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_expired_cookie_filtered_only_when_checking() {
        let jar = MemoryJar::new();
        jar.set_from_headers(&["dead=1; Max-Age=0".to_string()], QUOTE_URL)
            .await
            .unwrap();

        assert!(jar.get_cookies(QUOTE_URL, true).await.unwrap().is_empty());
        // Without the expiry check the entry is still recorded.
        assert_eq!(jar.get_cookies(QUOTE_URL, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insertion_order_preserved_and_replacement_in_place() {
        let jar = MemoryJar::new();
        jar.set_from_headers(
            &["first=1".to_string(), "second=2".to_string()],
            QUOTE_URL,
        )
        .await
        .unwrap();
        jar.set_from_headers(&["first=updated".to_string()], QUOTE_URL)
            .await
            .unwrap();

        let cookies = jar.get_cookies(QUOTE_URL, true).await.unwrap();
        assert_eq!(cookies[0].key, "first");
        assert_eq!(cookies[0].value, "updated");
        assert_eq!(cookies[1].key, "second");
    }

    #[tokio::test]
    async fn test_synthetic_config_url_round_trip() {
        let jar = MemoryJar::new();
        jar.set_cookie("crumb", "abc123", "http://config.yf2/")
            .await
            .unwrap();

        let cookies = jar.get_cookies("http://config.yf2/", false).await.unwrap();
        assert_eq!(
            cookies,
            vec![CookiePair {
                key: "crumb".to_string(),
                value: "abc123".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_path_scoping() {
        let jar = MemoryJar::new();
        jar.set_from_headers(
            &["scoped=1; Path=/consent".to_string()],
            "https://guce.yahoo.com/consent",
        )
        .await
        .unwrap();

        assert_eq!(
            jar.get_cookies("https://guce.yahoo.com/consent/step2", true)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(jar
            .get_cookies("https://guce.yahoo.com/other", true)
            .await
            .unwrap()
            .is_empty());
    }
}

//! Reqwest Fetch Adapter - HTTP Transport
//!
//! Implements the `HttpFetch` port over reqwest. The client never follows
//! redirects: every step of the crumb flow inspects `Location` itself.
//!
//! The token request advertises `accept-encoding: gzip, deflate, br`, so
//! reqwest's decompression features must stay enabled. Reqwest decodes the
//! compressed response even when the header is set manually, and `fetch`
//! always yields the decoded text, never raw compressed bytes.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::{redirect, Client};

use crate::domain::options::{FetchOptions, Method};
use crate::ports::{FetchResponse, HttpFetch};

/// HTTP transport backed by reqwest. Surfaces 3xx responses as-is.
pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    /// Build the client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse> {
        let mut request = match options.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        for (name, value) in options.headers() {
            request = request.header(name, value);
        }
        if let Some(body) = options.body() {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        let set_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str() != "set-cookie")
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text,
            headers,
            set_cookie,
            body,
        })
    }
}

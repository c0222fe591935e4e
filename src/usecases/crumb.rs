//! Crumb Acquisition Orchestrator - Cached Token Acquisition
//!
//! Entry point of the crate. `CrumbService::acquire` restores a cached
//! crumb from the jar when the session is still live, otherwise drives the
//! full page-fetch -> redirect-classification -> (consent flow) ->
//! crumb-endpoint sequence and caches the result.
//!
//! Concurrency: exactly one acquisition sequence is in flight per service
//! instance. The in-flight handle is a shared future installed under the
//! state lock before any I/O is awaited, so concurrent callers always
//! observe it and await the same outcome. The handle is cleared
//! unconditionally on completion, success or failure, so the next call can
//! attempt from scratch.

use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::config::ProviderConfig;
use crate::domain::options::FetchOptions;
use crate::domain::redirect::{self, RedirectTarget};
use crate::errors::{CrumbError, CrumbResult};
use crate::ports::{CookieJar, HttpFetch};
use crate::usecases::consent_flow;

pub(crate) const STAGE_CRUMB_PAGE: &str = "crumb-page";
pub(crate) const STAGE_GET_CRUMB: &str = "get-crumb";

/// Name of the jar cookie the crumb is cached under, scoped to the
/// synthetic configuration URL.
const CRUMB_COOKIE: &str = "crumb";

type AcquireFuture = Shared<BoxFuture<'static, CrumbResult<String>>>;

/// Provider configuration compiled into ready-to-use endpoints.
struct Endpoints {
    quote_page: Url,
    origin: String,
    crumb_url: String,
    cache_url: String,
    consent_gateway: Regex,
    collect_consent: Regex,
    user_agent: String,
}

impl Endpoints {
    fn from_config(config: &ProviderConfig) -> CrumbResult<Self> {
        let quote_page = parse_url("quote_page_url", &config.quote_page_url)?;
        parse_url("cookie_cache_url", &config.cookie_cache_url)?;
        parse_url("crumb_url", &config.crumb_url)?;

        let origin = quote_page.origin().ascii_serialization();

        Ok(Self {
            origin,
            crumb_url: config.crumb_url.clone(),
            cache_url: config.cookie_cache_url.clone(),
            consent_gateway: parse_pattern("consent_gateway_pattern", &config.consent_gateway_pattern)?,
            collect_consent: parse_pattern("collect_consent_pattern", &config.collect_consent_pattern)?,
            user_agent: config.user_agent.clone(),
            quote_page,
        })
    }
}

fn parse_url(name: &str, value: &str) -> CrumbResult<Url> {
    Url::parse(value).map_err(|e| CrumbError::InvalidConfiguration {
        message: format!("{name} {value:?}: {e}"),
    })
}

fn parse_pattern(name: &str, value: &str) -> CrumbResult<Regex> {
    Regex::new(value).map_err(|e| CrumbError::InvalidConfiguration {
        message: format!("{name} {value:?}: {e}"),
    })
}

#[derive(Default)]
struct ServiceState {
    /// Last successfully acquired crumb.
    cached: Option<String>,
    /// The running acquisition attempt, if any. At most one exists.
    inflight: Option<AcquireFuture>,
}

/// Crumb acquisition service.
///
/// Owns the in-process crumb cache and the singleflight guard. Collaborators
/// are injected at construction; see [`CrumbService::builder`].
pub struct CrumbService {
    fetch: Arc<dyn HttpFetch>,
    jar: Arc<dyn CookieJar>,
    endpoints: Endpoints,
    state: Mutex<ServiceState>,
}

impl CrumbService {
    pub fn builder() -> CrumbServiceBuilder {
        CrumbServiceBuilder::default()
    }

    /// Acquire a crumb, starting a new acquisition sequence only when none
    /// is already in flight. Concurrent callers share the same outcome.
    pub async fn acquire(self: &Arc<Self>) -> CrumbResult<String> {
        let inflight = {
            // Check-and-set happens entirely under the lock, with no await
            // between observing "no handle" and installing one.
            let mut state = self.state.lock().await;
            if let Some(existing) = &state.inflight {
                debug!("acquisition already in flight, awaiting shared outcome");
                existing.clone()
            } else {
                let service = Arc::clone(self);
                let attempt = async move {
                    let result = service.run_acquisition().await;
                    let mut state = service.state.lock().await;
                    state.inflight = None;
                    if let Ok(crumb) = &result {
                        state.cached = Some(crumb.clone());
                    }
                    result
                };
                let shared = attempt.boxed().shared();
                state.inflight = Some(shared.clone());
                shared
            }
        };

        inflight.await
    }

    /// The crumb from the last successful acquisition, if any.
    pub async fn cached_crumb(&self) -> Option<String> {
        self.state.lock().await.cached.clone()
    }

    /// Drop the in-process cached crumb so the next `acquire` re-validates
    /// against the jar (used by consumers after an authentication failure).
    pub async fn invalidate(&self) {
        self.state.lock().await.cached = None;
    }

    /// The full acquisition sequence. Runs inside the singleflight handle.
    async fn run_acquisition(&self) -> CrumbResult<String> {
        // Fast path: a restored crumb plus any non-expired cookie at the
        // quote-page URL counts as a live session. The cookie's name is
        // deliberately not checked.
        if let Some(crumb) = self.restored_crumb().await? {
            let live = self
                .jar
                .get_cookies(self.endpoints.quote_page.as_str(), true)
                .await
                .map_err(|e| CrumbError::transport(STAGE_CRUMB_PAGE, e))?;
            if !live.is_empty() {
                debug!("reusing cached crumb, session cookies still live");
                return Ok(crumb);
            }
        }

        let base = FetchOptions::new()
            .with_header("accept", "text/html,application/xhtml+xml,application/xml");

        debug!(url = %self.endpoints.quote_page, "fetching crumb page and session cookies");
        let response = self
            .fetch
            .fetch(self.endpoints.quote_page.as_str(), &base)
            .await
            .map_err(|e| CrumbError::transport(STAGE_CRUMB_PAGE, e))?;

        if response.set_cookie.is_empty() {
            return Err(CrumbError::MissingSetCookie {
                stage: STAGE_CRUMB_PAGE,
            });
        }
        self.jar
            .set_from_headers(&response.set_cookie, self.endpoints.quote_page.as_str())
            .await
            .map_err(|e| CrumbError::transport(STAGE_CRUMB_PAGE, e))?;

        let (crumb_source, crumb_options) = match response.location() {
            None => (self.endpoints.quote_page.to_string(), base.clone()),
            Some(location) => {
                match redirect::classify(
                    location,
                    &self.endpoints.quote_page,
                    &self.endpoints.consent_gateway,
                )? {
                    RedirectTarget::ConsentGateway(gateway_url) => {
                        let outcome = consent_flow::run(
                            self.fetch.as_ref(),
                            self.jar.as_ref(),
                            &self.endpoints.collect_consent,
                            &base,
                            &gateway_url,
                        )
                        .await?;
                        (outcome.url, outcome.options)
                    }
                    RedirectTarget::SameOrigin(resolved) => {
                        let cookie = self
                            .jar
                            .get_cookie_string(&resolved)
                            .await
                            .map_err(|e| CrumbError::transport(STAGE_CRUMB_PAGE, e))?;
                        (resolved, base.clone().with_header("cookie", cookie))
                    }
                    RedirectTarget::CrossOrigin(location) => {
                        return Err(CrumbError::UnsupportedRedirectOrigin { location });
                    }
                }
            }
        };

        // The crumb source must hold at least one live session cookie.
        let session = self
            .jar
            .get_cookies(&crumb_source, true)
            .await
            .map_err(|e| CrumbError::transport(STAGE_GET_CRUMB, e))?;
        if session.is_empty() {
            return Err(CrumbError::MissingCrumbCookie { url: crumb_source });
        }

        let cookie = self
            .jar
            .get_cookie_string(&self.endpoints.crumb_url)
            .await
            .map_err(|e| CrumbError::transport(STAGE_GET_CRUMB, e))?;
        let crumb_options = crumb_options
            .with_header("user-agent", &self.endpoints.user_agent)
            .with_header("cookie", cookie)
            .with_header("origin", &self.endpoints.origin)
            .with_header("referer", &crumb_source)
            .with_header("accept", "*/*")
            .with_header("accept-encoding", "gzip, deflate, br")
            .with_header("accept-language", "en-US,en;q=0.9")
            .with_header("content-type", "text/plain");

        debug!(url = %self.endpoints.crumb_url, "fetching crumb");
        let token = self
            .fetch
            .fetch(&self.endpoints.crumb_url, &crumb_options)
            .await
            .map_err(|e| CrumbError::transport(STAGE_GET_CRUMB, e))?;

        if token.status != 200 {
            return Err(CrumbError::CrumbEndpointFailure {
                status: token.status,
                status_text: token.status_text,
            });
        }
        if token.body.is_empty() {
            return Err(CrumbError::EmptyCrumbBody);
        }

        self.jar
            .set_cookie(CRUMB_COOKIE, &token.body, &self.endpoints.cache_url)
            .await
            .map_err(|e| CrumbError::transport(STAGE_GET_CRUMB, e))?;

        debug!("acquired new crumb");
        Ok(token.body)
    }

    /// Restore the crumb cookie from the jar's synthetic configuration URL
    /// into the in-process cache, then report whatever the cache holds.
    async fn restored_crumb(&self) -> CrumbResult<Option<String>> {
        let cookies = self
            .jar
            .get_cookies(&self.endpoints.cache_url, false)
            .await
            .map_err(|e| CrumbError::transport(STAGE_CRUMB_PAGE, e))?;
        let restored = cookies
            .into_iter()
            .find(|cookie| cookie.key == CRUMB_COOKIE)
            .map(|cookie| cookie.value);

        let mut state = self.state.lock().await;
        if restored.is_some() {
            state.cached = restored;
        }
        Ok(state.cached.clone())
    }
}

/// Builder for [`CrumbService`].
///
/// The fetch and cookie-jar collaborators are required; building without
/// them reports `EnvironmentNotInitialized` for the missing one.
#[derive(Default)]
pub struct CrumbServiceBuilder {
    fetch: Option<Arc<dyn HttpFetch>>,
    jar: Option<Arc<dyn CookieJar>>,
    provider: ProviderConfig,
}

impl CrumbServiceBuilder {
    pub fn fetch(mut self, fetch: Arc<dyn HttpFetch>) -> Self {
        self.fetch = Some(fetch);
        self
    }

    pub fn cookie_jar(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.jar = Some(jar);
        self
    }

    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn build(self) -> CrumbResult<Arc<CrumbService>> {
        let fetch = self.fetch.ok_or(CrumbError::EnvironmentNotInitialized {
            collaborator: "fetch",
        })?;
        let jar = self.jar.ok_or(CrumbError::EnvironmentNotInitialized {
            collaborator: "cookie jar",
        })?;
        let endpoints = Endpoints::from_config(&self.provider)?;

        Ok(Arc::new(CrumbService {
            fetch,
            jar,
            endpoints,
            state: Mutex::new(ServiceState::default()),
        }))
    }
}

//! Consent Flow Driver - Four-stage Cookie Consent Pipeline
//!
//! First-time or region-flagged clients get bounced through the provider's
//! consent gateway before a session cookie is usable. The sequence is
//! strict: landing -> collect-consent -> collect-consent submit ->
//! copy-consent, each stage depending on cookies set by its predecessor.
//! Stages must never be reordered or run in parallel.
//!
//! Every stage carries a diagnostic tag so the failing stage is
//! identifiable in logs and error variants.

use regex::Regex;
use tracing::debug;

use crate::domain::consent_form;
use crate::domain::options::{FetchOptions, Method};
use crate::errors::{CrumbError, CrumbResult};
use crate::ports::{CookieJar, FetchResponse, HttpFetch};

pub(crate) const STAGE_LANDING: &str = "consent-landing";
pub(crate) const STAGE_COLLECT: &str = "collect-consent";
pub(crate) const STAGE_SUBMIT: &str = "collect-consent-submit";
pub(crate) const STAGE_COPY: &str = "copy-consent";

/// Where the consent flow ends up: the crumb source URL plus the request
/// options to fetch it with.
#[derive(Debug, Clone)]
pub(crate) struct ConsentOutcome {
    pub url: String,
    pub options: FetchOptions,
}

/// Drive the full consent sequence starting from the gateway redirect.
///
/// `base` carries the original request headers; each stage derives its own
/// options from the previous stage's by overlay, attaching the jar's
/// current cookie string for the stage's target URL.
pub(crate) async fn run(
    fetch: &dyn HttpFetch,
    jar: &dyn CookieJar,
    collect_consent: &Regex,
    base: &FetchOptions,
    gateway_url: &str,
) -> CrumbResult<ConsentOutcome> {
    // Stage 1: landing fetch. Must redirect into the collect-consent form.
    let landing_options = base
        .clone()
        .with_header("cookie", cookie_header(jar, STAGE_LANDING, gateway_url).await?);
    let landing = fetch_stage(fetch, STAGE_LANDING, gateway_url, &landing_options).await?;

    let collect_url = landing
        .location()
        .ok_or(CrumbError::MissingLocationHeader {
            stage: STAGE_LANDING,
        })?
        .to_string();

    if !collect_consent.is_match(&collect_url) {
        return Err(CrumbError::UnexpectedRedirectTarget {
            location: collect_url,
        });
    }

    // Stage 2: fetch the consent form and scrape its hidden fields.
    let collect_options = landing_options
        .clone()
        .with_header("cookie", cookie_header(jar, STAGE_COLLECT, &collect_url).await?);
    let collect = fetch_stage(fetch, STAGE_COLLECT, &collect_url, &collect_options).await?;
    let form_body = consent_form::consent_form_body(&collect.body);

    // Stage 3: POST the scraped form back. Must set cookies and redirect.
    let submit_options = collect_options
        .clone()
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_method(Method::Post)
        .with_body(form_body);
    let submit = fetch_stage(fetch, STAGE_SUBMIT, &collect_url, &submit_options).await?;

    if submit.set_cookie.is_empty() {
        return Err(CrumbError::MissingSetCookie {
            stage: STAGE_SUBMIT,
        });
    }
    jar.set_from_headers(&submit.set_cookie, &collect_url)
        .await
        .map_err(|e| CrumbError::transport(STAGE_SUBMIT, e))?;

    let copy_url = submit
        .location()
        .ok_or(CrumbError::MissingLocationHeader {
            stage: STAGE_SUBMIT,
        })?
        .to_string();

    // Stage 4: follow the submit redirect to copy the consent cookies.
    let copy_options = landing_options
        .clone()
        .with_header("cookie", cookie_header(jar, STAGE_COPY, &copy_url).await?);
    let copy = fetch_stage(fetch, STAGE_COPY, &copy_url, &copy_options).await?;

    if copy.set_cookie.is_empty() {
        return Err(CrumbError::MissingSetCookie { stage: STAGE_COPY });
    }
    jar.set_from_headers(&copy.set_cookie, &copy_url)
        .await
        .map_err(|e| CrumbError::transport(STAGE_COPY, e))?;

    let final_url = copy
        .location()
        .ok_or(CrumbError::MissingLocationHeader { stage: STAGE_COPY })?
        .to_string();

    // The crumb source is fetched with the original base headers plus the
    // cookies accumulated at the submit-redirect URL.
    let final_options = base
        .clone()
        .with_header("cookie", cookie_header(jar, STAGE_COPY, &copy_url).await?);

    Ok(ConsentOutcome {
        url: final_url,
        options: final_options,
    })
}

async fn fetch_stage(
    fetch: &dyn HttpFetch,
    stage: &'static str,
    url: &str,
    options: &FetchOptions,
) -> CrumbResult<FetchResponse> {
    debug!(stage, url, "fetch");
    fetch
        .fetch(url, options)
        .await
        .map_err(|e| CrumbError::transport(stage, e))
}

async fn cookie_header(
    jar: &dyn CookieJar,
    stage: &'static str,
    url: &str,
) -> CrumbResult<String> {
    jar.get_cookie_string(url)
        .await
        .map_err(|e| CrumbError::transport(stage, e))
}

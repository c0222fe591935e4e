//! Redirect Classifier - Consent Gateway Detection
//!
//! Inspects a `Location` header and decides what kind of redirect the
//! provider issued. The consent-gateway check runs on the raw location
//! string before any resolution, mirroring the provider's observed
//! behavior of redirecting to a dedicated consent host. Relative locations
//! are resolved against the original URL before origins are compared.

use regex::Regex;
use url::Url;

use crate::errors::{CrumbError, CrumbResult};

/// Outcome of classifying a top-level redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The location matches the consent-gateway pattern; the consent flow
    /// must run. Carries the raw location for the landing fetch.
    ConsentGateway(String),
    /// The location resolves to the same origin as the original request.
    /// Carries the absolute resolved URL.
    SameOrigin(String),
    /// Any other origin. The orchestrator treats this as fatal.
    CrossOrigin(String),
}

/// Classify `location` relative to the request it redirected from.
///
/// A location that cannot be resolved into a URL at all is reported as an
/// unsupported redirect, the same way an unexpected origin is.
pub fn classify(
    location: &str,
    base: &Url,
    consent_gateway: &Regex,
) -> CrumbResult<RedirectTarget> {
    if consent_gateway.is_match(location) {
        return Ok(RedirectTarget::ConsentGateway(location.to_string()));
    }

    let resolved = base
        .join(location)
        .map_err(|_| CrumbError::UnsupportedRedirectOrigin {
            location: location.to_string(),
        })?;

    if resolved.origin() == base.origin() {
        Ok(RedirectTarget::SameOrigin(resolved.into()))
    } else {
        Ok(RedirectTarget::CrossOrigin(location.to_string()))
    }
}

//! Crumb Acquisition Errors - Failure Taxonomy
//!
//! Every fatal condition in the acquisition sequence has its own variant so
//! callers and logs can tell "no set-cookie" from "unsupported redirect"
//! from "empty crumb body". Nothing here is retried internally; the
//! singleflight handle is cleared on failure so the next call starts fresh.
//!
//! The enum is `Clone` because the in-flight acquisition is a shared future
//! whose output fans out to every concurrent caller; collaborator errors are
//! wrapped in `Arc` to keep cloning cheap.

use std::sync::Arc;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type CrumbResult<T> = Result<T, CrumbError>;

/// Fatal conditions of a single acquisition attempt.
#[derive(Debug, Clone, Error)]
pub enum CrumbError {
    /// A response that must establish session cookies carried no
    /// `set-cookie` header (provider contract violated).
    #[error("no set-cookie header on {stage} response")]
    MissingSetCookie { stage: &'static str },

    /// The consent landing redirect pointed somewhere other than the
    /// collect-consent form.
    #[error("unexpected redirect to {location}")]
    UnexpectedRedirectTarget { location: String },

    /// A consent stage that must redirect did not return a `Location`
    /// header.
    #[error("no location header on {stage} response")]
    MissingLocationHeader { stage: &'static str },

    /// The quote page redirected to a third-party origin that is neither
    /// the consent gateway nor the provider itself.
    #[error("unsupported redirect to {location}, please report")]
    UnsupportedRedirectOrigin { location: String },

    /// No cookie was recorded for the crumb source URL; the provider's
    /// session handshake may have changed.
    #[error("no session cookie recorded for {url}; the provider may have changed")]
    MissingCrumbCookie { url: String },

    /// The token endpoint answered with a non-200 status.
    #[error("crumb endpoint returned {status} {status_text}")]
    CrumbEndpointFailure { status: u16, status_text: String },

    /// The token endpoint answered 200 with no content.
    #[error("crumb endpoint returned an empty body; the provider may have changed")]
    EmptyCrumbBody,

    /// A required collaborator was not supplied before the service was
    /// built.
    #[error("{collaborator} collaborator has not been initialised")]
    EnvironmentNotInitialized { collaborator: &'static str },

    /// The provider configuration could not be compiled into usable
    /// endpoints (unparseable URL or pattern).
    #[error("invalid provider configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A collaborator (transport or cookie jar) failed below the protocol
    /// level.
    #[error("{stage} failed: {cause}")]
    Transport {
        stage: &'static str,
        cause: Arc<anyhow::Error>,
    },
}

impl CrumbError {
    /// Wrap a collaborator error, tagging it with the failing stage.
    pub fn transport(stage: &'static str, cause: anyhow::Error) -> Self {
        Self::Transport {
            stage,
            cause: Arc::new(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_render_distinct_messages() {
        let missing = CrumbError::MissingSetCookie {
            stage: "crumb-page",
        };
        assert_eq!(
            missing.to_string(),
            "no set-cookie header on crumb-page response"
        );

        let endpoint = CrumbError::CrumbEndpointFailure {
            status: 429,
            status_text: "Too Many Requests".to_string(),
        };
        assert_eq!(
            endpoint.to_string(),
            "crumb endpoint returned 429 Too Many Requests"
        );
    }

    #[test]
    fn test_transport_preserves_cause() {
        let err = CrumbError::transport("get-crumb", anyhow::anyhow!("connection reset"));
        assert!(err.to_string().contains("get-crumb"));
        assert!(err.to_string().contains("connection reset"));
    }
}

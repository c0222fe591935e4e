//! Fetch Options - Immutable Per-request Values
//!
//! Each consent stage derives its request options from the previous stage's
//! base by overlaying fields on a clone. Nothing is ever mutated in place
//! across stages, which rules out accidental header leakage between steps
//! of the flow.

/// HTTP method of a request. The acquisition flow only ever needs these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// An immutable bag of request options.
///
/// Headers keep insertion order and are unique by case-insensitive name:
/// overlaying a header that already exists replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Derive new options with `name: value` set, replacing any existing
    /// header of the same (case-insensitive) name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_bare_get() {
        let options = FetchOptions::new();
        assert_eq!(options.method(), Method::Get);
        assert!(options.body().is_none());
        assert_eq!(options.headers().count(), 0);
    }

    #[test]
    fn test_overlay_replaces_header_case_insensitively() {
        let options = FetchOptions::new()
            .with_header("Cookie", "a=1")
            .with_header("accept", "text/html")
            .with_header("cookie", "b=2");

        assert_eq!(options.header("cookie"), Some("b=2"));
        // Replacement keeps the original position and does not duplicate.
        let headers: Vec<_> = options.headers().collect();
        assert_eq!(headers, vec![("Cookie", "b=2"), ("accept", "text/html")]);
    }

    #[test]
    fn test_derivation_leaves_base_untouched() {
        let base = FetchOptions::new().with_header("accept", "text/html");
        let derived = base
            .clone()
            .with_method(Method::Post)
            .with_body("agree=agree")
            .with_header("content-type", "application/x-www-form-urlencoded");

        assert_eq!(base.method(), Method::Get);
        assert!(base.body().is_none());
        assert_eq!(base.header("content-type"), None);

        assert_eq!(derived.method(), Method::Post);
        assert_eq!(derived.body(), Some("agree=agree"));
        assert_eq!(derived.header("accept"), Some("text/html"));
    }
}

//! HTML Consent Scraper - Hidden Field Extraction
//!
//! The collect-consent page is a plain HTML form. We pull out every
//! `<input type="hidden" name=".." value="..">` in document order and
//! serialize them into a form-encoded submission body, finishing with the
//! agree checkbox submitted twice because the provider's own form does and
//! servers have been observed to require both pairs.
//!
//! This is a contract with an external, unversioned HTML page and may break
//! upstream at any time.

use lazy_static::lazy_static;
use regex::Regex;
use urlencoding::encode;

lazy_static! {
    static ref HIDDEN_INPUT: Regex =
        Regex::new(r#"<input type="hidden" name="([^"]+)" value="([^"]+)">"#)
            .expect("hidden input pattern is valid");
    static ref NUMERIC_ENTITY: Regex =
        Regex::new(r"(?i)&#x([0-9A-F]{1,3});").expect("entity pattern is valid");
}

/// Decode numeric hex character references (`&#x26;` -> `&`).
///
/// Only short references (up to three hex digits) occur in the consent
/// form; anything unparseable is left as literal text.
pub fn decode_numeric_entities(value: &str) -> String {
    NUMERIC_ENTITY
        .replace_all(value, |captures: &regex::Captures<'_>| {
            u32::from_str_radix(&captures[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| captures[0].to_string(), String::from)
        })
        .into_owned()
}

/// Extract `(name, value)` pairs of all hidden inputs, in document order.
///
/// Repeated names are preserved as repeated pairs, matching standard
/// form-encoding semantics.
pub fn scrape_hidden_fields(html: &str) -> Vec<(String, String)> {
    HIDDEN_INPUT
        .captures_iter(html)
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

/// Build the collect-consent submission body from the page HTML.
///
/// Each field becomes `name=encoded(value)&`; entity references in values
/// are decoded before percent-encoding. The trailing doubled agree pair is
/// always appended.
pub fn consent_form_body(html: &str) -> String {
    let mut body = String::new();
    for (name, value) in scrape_hidden_fields(html) {
        body.push_str(&name);
        body.push('=');
        body.push_str(&encode(&decode_numeric_entities(&value)));
        body.push('&');
    }
    body.push_str("agree=agree&agree=agree");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_preserves_document_order() {
        let html = concat!(
            "<form method=\"post\">",
            "<input type=\"hidden\" name=\"csrfToken\" value=\"tok123\">",
            "<input type=\"hidden\" name=\"sessionId\" value=\"sess456\">",
            "<input type=\"text\" name=\"visible\" value=\"nope\">",
            "</form>",
        );

        let fields = scrape_hidden_fields(html);
        assert_eq!(
            fields,
            vec![
                ("csrfToken".to_string(), "tok123".to_string()),
                ("sessionId".to_string(), "sess456".to_string()),
            ]
        );
    }

    #[test]
    fn test_repeated_names_are_not_deduplicated() {
        let html = concat!(
            "<input type=\"hidden\" name=\"brand\" value=\"a\">",
            "<input type=\"hidden\" name=\"brand\" value=\"b\">",
        );

        assert_eq!(consent_form_body(html), "brand=a&brand=b&agree=agree&agree=agree");
    }

    #[test]
    fn test_body_ends_with_doubled_agree() {
        let html = concat!(
            "<input type=\"hidden\" name=\"a\" value=\"1\">",
            "<input type=\"hidden\" name=\"b\" value=\"2\">",
        );

        assert_eq!(consent_form_body(html), "a=1&b=2&agree=agree&agree=agree");
    }

    #[test]
    fn test_empty_page_still_submits_agree() {
        assert_eq!(consent_form_body("<html></html>"), "agree=agree&agree=agree");
    }

    #[test]
    fn test_entities_decode_before_encoding() {
        // &#x26; is '&', which must come out percent-encoded.
        let html = "<input type=\"hidden\" name=\"name\" value=\"&#x26;\">";
        assert_eq!(consent_form_body(html), "name=%26&agree=agree&agree=agree");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_numeric_entities("&#x26;"), "&");
        assert_eq!(decode_numeric_entities("&#X27;"), "'");
        assert_eq!(decode_numeric_entities("a&#x20;b"), "a b");
        // Unparseable references stay literal.
        assert_eq!(decode_numeric_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_numeric_entities("plain"), "plain");
    }
}

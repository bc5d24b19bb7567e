//! Small URL helpers shared by the redirecting middleware.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded;

/// Everything but ASCII alphanumerics and the characters a URI may carry
/// as-is, including `%` so existing escapes survive.
const IRI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'#')
    .remove(b'%')
    .remove(b'[')
    .remove(b']')
    .remove(b'=')
    .remove(b':')
    .remove(b';')
    .remove(b'$')
    .remove(b'&')
    .remove(b'(')
    .remove(b')')
    .remove(b'+')
    .remove(b',')
    .remove(b'!')
    .remove(b'?')
    .remove(b'*')
    .remove(b'@')
    .remove(b'\'');

/// Percent-encode everything that may not appear in a `Location` header.
///
/// Existing `%` escapes and URI delimiters are kept, so already-encoded
/// input passes through unchanged.
pub fn iri_to_uri(iri: &str) -> String {
    utf8_percent_encode(iri, IRI).to_string()
}

/// Decoded `key=value` pairs of a query string.
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Append `params` to `path` as a query string, skipping it when empty.
pub fn urlparams(path: &str, params: &[(String, String)]) -> String {
    let path = iri_to_uri(path);
    if params.is_empty() {
        return path;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_ascii_is_percent_encoded() {
        assert_eq!(iri_to_uri("xxx=\u{c3}"), "xxx=%C3%83");
        assert_eq!(iri_to_uri("/fr/firefox/caf\u{e9}"), "/fr/firefox/caf%C3%A9");
    }

    #[test]
    fn encoded_input_is_untouched() {
        let q = "from=/da/firefox/addon/5457%3Fadvancedsearch%3D1&utm_source=Google+%E3%83%90";
        assert_eq!(iri_to_uri(q), q);
    }

    #[test]
    fn spaces_and_quotes_are_escaped() {
        assert_eq!(iri_to_uri("a b\"c<d>"), "a%20b%22c%3Cd%3E");
    }

    #[test]
    fn query_pairs_decode() {
        assert_eq!(
            query_pairs("lang=ja&utm_source=Google+%E3%83%90"),
            vec![
                ("lang".to_string(), "ja".to_string()),
                ("utm_source".to_string(), "Google \u{30d0}".to_string()),
            ]
        );
    }

    #[test]
    fn urlparams_builds_query() {
        let params = vec![
            ("q".to_string(), "tab mix".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        assert_eq!(urlparams("/ja/firefox/search/", &params), "/ja/firefox/search/?q=tab+mix&page=2");
        assert_eq!(urlparams("/ja/firefox/", &[]), "/ja/firefox/");
    }
}

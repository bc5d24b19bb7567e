//! `Accept-Language` parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::PrefixConfig;

static LANGUAGE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z]{1,8}(?:-[A-Za-z0-9]{1,8})*|\*)\s*(?:;\s*q\s*=\s*([0-9](?:\.[0-9]{0,3})?))?\s*$")
        .expect("static regex is valid")
});

/// Parse an `Accept-Language` header into `(language, q)` pairs, highest
/// quality first. Malformed ranges are dropped; ties keep header order.
pub fn parse(header: &str) -> Vec<(String, f32)> {
    let mut ranges: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let caps = LANGUAGE_RANGE.captures(part)?;
            let q = match caps.get(2) {
                Some(q) => q.as_str().parse::<f32>().ok()?,
                None => 1.0,
            };
            Some((caps[1].to_string(), q))
        })
        .collect();
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges
}

/// Pick the supported locale that best satisfies an `Accept-Language` header.
pub fn best_locale(header: &str, config: &PrefixConfig) -> Option<String> {
    parse(header)
        .into_iter()
        .filter(|(lang, q)| *q > 0.0 && lang != "*")
        .find_map(|(lang, _)| match_locale(&lang, config))
}

fn match_locale(lang: &str, config: &PrefixConfig) -> Option<String> {
    if let Some(found) = config.locale_for(lang) {
        return Some(found.to_string());
    }
    // Fall back on the primary subtag: "pt-PT" or "pt" can still land on "pt-BR".
    let primary = lang.split('-').next()?.to_ascii_lowercase();
    config
        .locales()
        .iter()
        .find(|locale| {
            let locale = locale.to_ascii_lowercase();
            locale == primary || locale.starts_with(&format!("{primary}-"))
        })
        .cloned()
}

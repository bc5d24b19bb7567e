use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Uri;
use axum::http::header::{ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderValue, USER_AGENT};
use axum::middleware::Next;
use axum::response::Response;

use super::{FullPath, RequestLocale, header_str, patch_vary, permanent_redirect};
use crate::config::PjaxConfig;
use crate::prefixer::Prefixer;
use crate::urls::{iri_to_uri, query_pairs, urlparams};

/// Redirects cache for a year.
const REDIRECT_MAX_AGE: &str = "max-age=31536000";

/// Locale/app URL middleware.
///
/// 1. Find the locale and app in the path.
/// 2. `?lang=xx` redirects to the same page in locale `xx`, without `lang`.
/// 3. Non-canonical paths redirect to their canonical form.
/// 4. Otherwise the prefix is stripped from the URI and recorded in
///    [`RequestLocale`] and [`FullPath`].
pub async fn locale_url(
    State(config): State<Arc<PjaxConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let params = query_pairs(&query);
    let lang = params
        .iter()
        .find(|(k, _)| k == "lang")
        .map(|(_, v)| v.as_str());

    let headers = request.headers();
    let prefixer = Prefixer::new(config.prefix(), &path)
        .with_lang(lang)
        .with_accept_language(header_str(headers, ACCEPT_LANGUAGE))
        .with_user_agent(header_str(headers, USER_AGENT));

    if lang.is_some() {
        // Blank out the locale so `lang` decides it, and drop `lang` so the
        // target does not redirect again.
        let mut prefixer = prefixer.clone();
        prefixer.locale.clear();
        let new_path = prefixer.canonical_path();
        let rest: Vec<(String, String)> = params
            .iter()
            .filter(|(k, _)| k != "lang")
            .cloned()
            .collect();
        tracing::debug!(from = %path, to = %new_path, "lang override redirect");
        return permanent_redirect(&urlparams(&new_path, &rest));
    }

    let full_path = prefixer.canonical_path();
    if full_path != path {
        let mut target = iri_to_uri(&full_path);
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }

        let mut response = permanent_redirect(&target);
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(REDIRECT_MAX_AGE));

        let (new_locale, new_app, _) = config.prefix().split_path(&full_path);
        if prefixer.locale != new_locale {
            patch_vary(&mut response, &["Accept-Language"]);
        }
        if prefixer.app != new_app {
            patch_vary(&mut response, &["User-Agent"]);
        }
        return response;
    }

    let locale = RequestLocale {
        locale: prefixer.effective_locale(),
        app: prefixer.effective_app(),
    };
    let shortened = if query.is_empty() {
        format!("/{}", prefixer.shortened_path)
    } else {
        format!("/{}?{}", prefixer.shortened_path, query)
    };
    match with_path_and_query(request.uri(), &shortened) {
        Some(uri) => *request.uri_mut() = uri,
        None => tracing::warn!("Cannot rewrite {path:?} to {shortened:?}"),
    }

    request.extensions_mut().insert(FullPath(path));
    request.extensions_mut().insert(locale);
    next.run(request).await
}

fn with_path_and_query(uri: &Uri, path_and_query: &str) -> Option<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_keeps_scheme_and_authority() {
        let uri: Uri = "http://addons.example.com/fr/firefox/about?x=1".parse().unwrap();
        let rewritten = with_path_and_query(&uri, "/about?x=1").unwrap();
        assert_eq!(rewritten.to_string(), "http://addons.example.com/about?x=1");
    }

    #[test]
    fn rewrite_origin_form() {
        let uri: Uri = "/fr/firefox/".parse().unwrap();
        let rewritten = with_path_and_query(&uri, "/").unwrap();
        assert_eq!(rewritten, "/");
    }
}

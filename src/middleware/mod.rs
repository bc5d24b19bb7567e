//! HTTP middleware for locale/app prefixes and Pjax.
//!
//! All middleware are plain `axum::middleware::from_fn` functions taking the
//! shared [`PjaxConfig`] as state. [`site_service`] stacks them in order
//! around a router.

mod locale;
mod pjax;
mod read_only;
mod slash;
mod timing;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue, LOCATION, VARY};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use tower::ServiceBuilder;

use crate::config::PjaxConfig;

pub use locale::locale_url;
pub use pjax::lazy_pjax;
pub use read_only::read_only;
pub use slash::remove_slash;
pub use timing::{RequestStart, timing};

/// Header that flags a Pjax request.
pub const PJAX_HEADER: &str = "x-pjax";

/// Locale and app the request is served in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLocale {
    pub locale: String,
    pub app: String,
}

/// The request path as received, before the locale/app prefix was stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullPath(pub String);

/// Set on every request passing [`lazy_pjax`]; templates use it to turn on
/// client-side Pjax.
#[derive(Clone, Copy, Debug)]
pub struct AllowsPjax;

/// Put this in the response extensions when the user is logged in.
#[derive(Clone, Copy, Debug)]
pub struct Authenticated;

/// Whether the request asked for a partial page.
pub fn is_pjax(headers: &HeaderMap) -> bool {
    headers
        .get(PJAX_HEADER)
        .is_some_and(|value| !value.is_empty())
}

/// Wrap `router` in the full middleware stack.
///
/// Order, outermost first: timing, locale/app prefixes, read-only guard,
/// trailing-slash fallback, Pjax extraction. The router is wrapped as a
/// service so the locale middleware's URI rewrite happens before routing.
pub fn site_service(router: Router, config: Arc<PjaxConfig>) -> Router {
    let service = ServiceBuilder::new()
        .layer(from_fn(timing))
        .layer(from_fn_with_state(config.clone(), locale_url))
        .layer(from_fn_with_state(config.clone(), read_only))
        .layer(from_fn_with_state(config.clone(), remove_slash))
        .layer(from_fn_with_state(config, lazy_pjax))
        .service(router);
    Router::new().fallback_service(service)
}

pub(crate) fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// 301 to `location`, which must already be URI-safe.
pub(crate) fn permanent_redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!("Cannot redirect to {location:?}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Add `fields` to the response's `Vary` header, keeping what is there.
pub(crate) fn patch_vary(response: &mut Response, fields: &[&str]) {
    let mut vary: Vec<String> = response
        .headers()
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    for field in fields {
        if !vary.iter().any(|f| f.eq_ignore_ascii_case(field)) {
            vary.push(field.to_string());
        }
    }
    if let Ok(value) = HeaderValue::from_str(&vary.join(", ")) {
        response.headers_mut().insert(VARY, value);
    }
}

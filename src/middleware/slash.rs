use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use super::{FullPath, permanent_redirect};
use crate::config::PjaxConfig;
use crate::urls::iri_to_uri;

/// Retry a 404 without its trailing slash.
///
/// When `/about/` does not resolve but `/about` does, redirect to the full
/// (still prefixed) path minus the slash, keeping a header-safe query.
pub async fn remove_slash(
    State(config): State<Arc<PjaxConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let path_info = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    // The prefix was stripped from the URI; redirect on the path as received.
    let full_path = request
        .extensions()
        .get::<FullPath>()
        .map(|p| p.0.clone())
        .unwrap_or_else(|| path_info.clone());

    let response = next.run(request).await;
    if response.status() != StatusCode::NOT_FOUND {
        return response;
    }

    let Some(stripped) = path_info.strip_suffix('/') else {
        return response;
    };
    if config.is_valid_path(&path_info) || !config.is_valid_path(stripped) {
        return response;
    }

    let mut target = full_path
        .strip_suffix('/')
        .unwrap_or(&full_path)
        .to_string();
    if !query.is_empty() {
        target.push('?');
        target.push_str(&iri_to_uri(&query));
    }
    tracing::debug!(from = %full_path, to = %target, "trailing slash redirect");
    permanent_redirect(&target)
}

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use super::FullPath;
use crate::config::PjaxConfig;
use crate::error::{UpstreamUnavailable, read_only_response};

/// Serve the temporary-unavailability page when writes cannot succeed.
///
/// In read-only mode every POST gets it straight away. Otherwise a write
/// request whose handler reported an upstream storage failure (a response
/// carrying [`UpstreamUnavailable`]) gets it instead of a generic error.
pub async fn read_only(
    State(config): State<Arc<PjaxConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    if config.read_only() && method == Method::POST {
        return read_only_response();
    }

    let path = request
        .extensions()
        .get::<FullPath>()
        .map(|p| p.0.clone())
        .unwrap_or_else(|| request.uri().path().to_string());
    let response = next.run(request).await;
    if is_write(&method) && response.extensions().get::<UpstreamUnavailable>().is_some() {
        tracing::error!(
            target: "read_only",
            %method,
            path = %path,
            "Datastore unavailable, serving read-only page"
        );
        let mut page = read_only_response();
        page.extensions_mut().insert(UpstreamUnavailable);
        return page;
    }
    response
}

fn is_write(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

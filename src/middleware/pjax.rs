use std::sync::Arc;

use axum::body::{Body, HttpBody, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::{AllowsPjax, FullPath, header_str, is_pjax};
use crate::block::PartialRendered;
use crate::config::PjaxConfig;
use crate::error::{Error, Result};

/// Replace successful Pjax responses with their title and content region.
///
/// Only `200` responses to requests with a non-empty `X-PJAX` header are
/// touched; bodies already rendered as a single block are left alone, as
/// are bodies known to exceed the configured body limit.
pub async fn lazy_pjax(
    State(config): State<Arc<PjaxConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Turns on client-side Pjax in templates.
    request.extensions_mut().insert(AllowsPjax);

    let pjax = is_pjax(request.headers());
    let path = request
        .extensions()
        .get::<FullPath>()
        .map(|p| p.0.clone())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    if !pjax
        || response.status() != StatusCode::OK
        || response.extensions().get::<PartialRendered>().is_some()
    {
        return response;
    }

    if let Some(size) = known_size(&response).filter(|&size| size > config.body_limit() as u64) {
        tracing::warn!(
            target: "pjax",
            path = %path,
            size,
            limit = config.body_limit(),
            "Response too large for Pjax extraction, serving it whole"
        );
        return response;
    }

    match extract(&config, response, &path).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Body size from `Content-Length`, or else the body's own lower bound.
fn known_size(response: &Response) -> Option<u64> {
    header_str(response.headers(), CONTENT_LENGTH)
        .and_then(|v| v.parse().ok())
        .or_else(|| {
            let lower = response.body().size_hint().lower();
            (lower > 0).then_some(lower)
        })
}

async fn extract(config: &PjaxConfig, response: Response, path: &str) -> Result<Response> {
    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, config.body_limit())
        .await
        .map_err(|e| Error::Body(e.to_string()))?;

    let fragment = {
        let html = String::from_utf8_lossy(&bytes);
        config.extractor().process(&html, config.mode(), path)?
    };
    match fragment {
        Some(fragment) => {
            parts.headers.remove(CONTENT_LENGTH);
            Ok(Response::from_parts(parts, Body::from(fragment)))
        }
        None => Ok(Response::from_parts(parts, Body::from(bytes))),
    }
}

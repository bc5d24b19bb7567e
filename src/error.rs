//! Error types for the `lazypjax` crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Body served whenever the primary datastore is unavailable.
pub const READ_ONLY_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>Temporarily unavailable</title></head>\
<body><h1>Temporarily unavailable</h1>\
<p>This site is in read-only mode for maintenance. Please try again shortly.</p></body></html>";

/// All errors that can occur while prefixing, rendering or extracting pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A Pjax response did not contain any element matching the content selector.
    #[error("pjax response for {path} does not contain selector {selector:?}")]
    MissingSelector { path: String, selector: String },

    /// The template has no top-level block with the configured name.
    #[error(
        "Pjax: template {template} for {path} does not contain block {block:?} \
         (inherited templates are ignored)"
    )]
    MissingBlock {
        template: String,
        path: String,
        block: String,
    },

    /// The configured CSS selector could not be parsed.
    #[error("Invalid CSS selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The template engine failed while rendering.
    #[error("Template error: {0}")]
    Render(Box<dyn std::error::Error + Send + Sync>),

    /// The primary datastore is temporarily unreachable.
    #[error("Upstream storage unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A response body could not be buffered.
    #[error("Body error: {0}")]
    Body(String),

    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Response marker telling [`read_only`](crate::middleware::read_only) that
/// the handler hit an upstream storage failure.
#[derive(Clone, Debug)]
pub struct UpstreamUnavailable;

/// Fixed 503 response shown while the datastore is unavailable.
pub fn read_only_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        READ_ONLY_PAGE,
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::UpstreamUnavailable(reason) => {
                tracing::error!(target: "read_only", "Upstream storage failure: {reason}");
                let mut response =
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
                response.extensions_mut().insert(UpstreamUnavailable);
                response
            }
            other => {
                tracing::error!("{other}");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_block_message_names_template_and_block() {
        let err = Error::MissingBlock {
            template: "reviews/list.html".into(),
            path: "/en-US/firefox/reviews/".into(),
            block: "page".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("reviews/list.html"));
        assert!(msg.contains("\"page\""));
        assert!(msg.contains("inherited templates are ignored"));
    }

    #[test]
    fn upstream_failure_is_marked() {
        let response = Error::UpstreamUnavailable("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<UpstreamUnavailable>().is_some());
    }

    #[test]
    fn read_only_page_is_503() {
        assert_eq!(read_only_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn developer_errors_are_500() {
        let err = Error::MissingSelector {
            path: "/".into(),
            selector: "#page".into(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

//! # lazypjax
//!
//! Locale/app-aware URL routing and Pjax partial rendering for `axum` sites.
//!
//! ## Overview
//!
//! Site URLs carry an optional locale and application prefix
//! (`/fr/firefox/addon/5457`). The [`Prefixer`] recognises those prefixes
//! against fixed allow-lists and rebuilds canonical paths; the
//! [`locale_url`](middleware::locale_url) middleware redirects to them and
//! strips the prefix before routing.
//!
//! Pjax requests (a non-empty `X-PJAX` header) get only part of a page,
//! in one of two independent ways:
//!
//! - [`BlockRenderer`] renders just the configured template block through
//!   an injected [`TemplateEngine`].
//! - [`lazy_pjax`](middleware::lazy_pjax) cuts the `<title>` and the
//!   content region (a CSS selector) out of a full `200` response with a
//!   [`FragmentExtractor`].
//!
//! A missing block or content region is handled according to [`Mode`]:
//! strict fails, lenient logs and serves the full page.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use lazypjax::{PjaxConfig, PrefixConfig, site_service};
//!
//! # async fn example() {
//! let prefix = PrefixConfig::builder()
//!     .locales(["en-US", "fr", "de"])
//!     .app("thunderbird", "Thunderbird")
//!     .app("firefox", "Firefox")
//!     .build()
//!     .unwrap();
//! let config = Arc::new(
//!     PjaxConfig::builder()
//!         .selector("#page")
//!         .block("page")
//!         .prefix(prefix)
//!         .valid_paths(|path| path == "/about")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let router = Router::new().route("/about", get(|| async { "about" }));
//! let app = site_service(router, config);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod fragment;
pub mod middleware;
pub mod prefixer;
pub mod urls;

pub use block::{
    BlockRenderer, BoxError, Context, ContextPipeline, ContextProcessor, PartialRendered,
    Rendered, TemplateEngine, request_processor,
};
pub use config::{Mode, PathValidator, PjaxConfig, PjaxConfigBuilder};
pub use error::{Error, Result, UpstreamUnavailable};
pub use fragment::{Fragment, FragmentExtractor};
pub use middleware::{
    AllowsPjax, Authenticated, FullPath, RequestLocale, is_pjax, site_service,
};
pub use prefixer::{App, PrefixConfig, PrefixConfigBuilder, Prefixer};

use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<PjaxConfig>> = OnceLock::new();

/// Install the process-wide [`PjaxConfig`].
///
/// Call once at application startup; afterwards any part of the application
/// can read the settings through [`global()`].
///
/// # Errors
///
/// Returns [`Error::Config`] if called more than once.
pub fn init(config: PjaxConfig) -> Result<Arc<PjaxConfig>> {
    let config = Arc::new(config);
    GLOBAL
        .set(config.clone())
        .map_err(|_| Error::Config("global PjaxConfig already initialized".into()))?;
    tracing::debug!(selector = config.selector(), block = config.block(), "pjax configured");
    Ok(config)
}

/// The settings registered with [`init()`], if any.
pub fn global() -> Option<Arc<PjaxConfig>> {
    GLOBAL.get().cloned()
}

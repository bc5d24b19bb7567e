//! Partial (Pjax) rendering of a single template block.
//!
//! The template engine is injected through [`TemplateEngine`]; the context
//! for both full and partial renders comes from the same
//! [`ContextPipeline`].

use std::sync::Arc;

use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Map, Value};

use crate::config::{Mode, PjaxConfig};
use crate::error::{Error, Result};
use crate::middleware::{AllowsPjax, FullPath, RequestLocale, is_pjax};

/// Template variables.
pub type Context = Map<String, Value>;

/// Error type returned by template engines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Rendering capability the renderer is built on.
pub trait TemplateEngine: Send + Sync {
    /// Render the whole page, following template inheritance.
    fn render(&self, template: &str, context: &Context) -> std::result::Result<String, BoxError>;

    /// Whether `template` itself defines `block`. Blocks that only exist in
    /// parent templates do not count.
    fn has_block(&self, template: &str, block: &str) -> std::result::Result<bool, BoxError>;

    /// Render the body of one block of `template`.
    fn render_block(
        &self,
        template: &str,
        block: &str,
        context: &Context,
    ) -> std::result::Result<String, BoxError>;
}

impl<T: TemplateEngine + ?Sized> TemplateEngine for Arc<T> {
    fn render(&self, template: &str, context: &Context) -> std::result::Result<String, BoxError> {
        (**self).render(template, context)
    }

    fn has_block(&self, template: &str, block: &str) -> std::result::Result<bool, BoxError> {
        (**self).has_block(template, block)
    }

    fn render_block(
        &self,
        template: &str,
        block: &str,
        context: &Context,
    ) -> std::result::Result<String, BoxError> {
        (**self).render_block(template, block, context)
    }
}

/// Adds request-derived variables to every template context.
pub trait ContextProcessor: Send + Sync {
    fn process(&self, request: &Parts) -> Context;
}

impl<F> ContextProcessor for F
where
    F: Fn(&Parts) -> Context + Send + Sync,
{
    fn process(&self, request: &Parts) -> Context {
        self(request)
    }
}

/// An ordered chain of [`ContextProcessor`]s.
///
/// Each processor's variables are merged over the view's own context and
/// the output of earlier processors.
#[derive(Default)]
pub struct ContextPipeline {
    processors: Vec<Box<dyn ContextProcessor>>,
}

impl ContextPipeline {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Append a processor to the end of the pipeline.
    pub fn add(&mut self, processor: impl ContextProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Build the final context for `request` starting from `base`.
    pub fn build(&self, request: &Parts, base: Context) -> Context {
        self.processors.iter().fold(base, |mut ctx, p| {
            ctx.extend(p.process(request));
            ctx
        })
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

/// Exposes `LANG`, `APP` and `ALLOWS_PJAX` from the request extensions set
/// by the middleware.
pub fn request_processor(request: &Parts) -> Context {
    let mut ctx = Context::new();
    if let Some(locale) = request.extensions.get::<RequestLocale>() {
        ctx.insert("LANG".into(), Value::String(locale.locale.clone()));
        ctx.insert("APP".into(), Value::String(locale.app.clone()));
    }
    ctx.insert(
        "ALLOWS_PJAX".into(),
        Value::Bool(request.extensions.get::<AllowsPjax>().is_some()),
    );
    ctx
}

/// Response marker for bodies that already are a rendered block, so the
/// fragment extractor leaves them alone.
#[derive(Clone, Copy, Debug)]
pub struct PartialRendered;

/// Output of [`BlockRenderer::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// `true` when only the Pjax block was rendered.
    pub partial: bool,
}

/// Renders full pages, or just the configured block for Pjax requests.
pub struct BlockRenderer<E> {
    engine: E,
    processors: ContextPipeline,
    config: Arc<PjaxConfig>,
}

impl<E: TemplateEngine> BlockRenderer<E> {
    pub fn new(engine: E, config: Arc<PjaxConfig>) -> Self {
        Self {
            engine,
            processors: ContextPipeline::new(),
            config,
        }
    }

    /// Append a context processor; see [`ContextPipeline::add`].
    pub fn add_processor(mut self, processor: impl ContextProcessor + 'static) -> Self {
        self.processors.add(processor);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render `template` for `request`.
    ///
    /// Pjax requests get the configured block only. If the template does
    /// not define it, strict mode returns [`Error::MissingBlock`] and
    /// lenient mode logs and renders the full page. Engine failures become
    /// [`Error::Render`] on both paths.
    pub fn render(&self, request: &Parts, template: &str, context: Context) -> Result<Rendered> {
        let ctx = self.processors.build(request, context);

        if is_pjax(&request.headers) {
            let block = self.config.block();
            if self
                .engine
                .has_block(template, block)
                .map_err(Error::Render)?
            {
                let body = self
                    .engine
                    .render_block(template, block, &ctx)
                    .map_err(Error::Render)?;
                return Ok(Rendered {
                    body,
                    partial: true,
                });
            }

            let err = Error::MissingBlock {
                template: template.to_string(),
                path: request
                    .extensions
                    .get::<FullPath>()
                    .map(|p| p.0.clone())
                    .unwrap_or_else(|| request.uri.path().to_string()),
                block: block.to_string(),
            };
            match self.config.mode() {
                Mode::Strict => return Err(err),
                Mode::Lenient => tracing::error!(target: "pjax", "{err}"),
            }
        }

        let body = self.engine.render(template, &ctx).map_err(Error::Render)?;
        Ok(Rendered {
            body,
            partial: false,
        })
    }

    /// Like [`render`](Self::render) but produce an HTML response with
    /// `status`. Errors go through [`Error`]'s `IntoResponse`, whichever
    /// path produced them.
    pub fn render_response(
        &self,
        request: &Parts,
        template: &str,
        context: Context,
        status: StatusCode,
    ) -> Response {
        match self.render(request, template, context) {
            Ok(rendered) => {
                let mut response = (status, Html(rendered.body)).into_response();
                if rendered.partial {
                    response.extensions_mut().insert(PartialRendered);
                }
                response
            }
            Err(err) => err.into_response(),
        }
    }
}

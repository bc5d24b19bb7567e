//! Builders for the process-wide Pjax and URL-prefix settings.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fragment::FragmentExtractor;
use crate::prefixer::PrefixConfig;

/// How a missing render target (block or content selector) is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Fail loudly so the developer fixes the template.
    Strict,
    /// Log the problem and serve the full page.
    #[default]
    Lenient,
}

/// Capability answering whether a path resolves to a route.
pub type PathValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Settings consumed by the renderer and the middleware.
///
/// Built with [`PjaxConfig::builder`]; cheap to share behind an `Arc`.
pub struct PjaxConfig {
    extractor: FragmentExtractor,
    block: String,
    mode: Mode,
    read_only: bool,
    body_limit: usize,
    prefix: PrefixConfig,
    is_valid_path: PathValidator,
}

impl PjaxConfig {
    pub fn builder() -> PjaxConfigBuilder {
        PjaxConfigBuilder::new()
    }

    pub fn extractor(&self) -> &FragmentExtractor {
        &self.extractor
    }

    pub fn selector(&self) -> &str {
        self.extractor.content_selector()
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn prefix(&self) -> &PrefixConfig {
        &self.prefix
    }

    /// Whether `path` (without locale/app prefix) resolves to a route.
    pub fn is_valid_path(&self, path: &str) -> bool {
        (self.is_valid_path)(path)
    }
}

impl std::fmt::Debug for PjaxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PjaxConfig")
            .field("selector", &self.selector())
            .field("block", &self.block)
            .field("mode", &self.mode)
            .field("read_only", &self.read_only)
            .field("body_limit", &self.body_limit)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PjaxConfig`].
///
/// # Example
///
/// ```
/// use lazypjax::{Mode, PjaxConfig, PrefixConfig};
///
/// let config = PjaxConfig::builder()
///     .selector("#page")
///     .block("page")
///     .mode(Mode::Strict)
///     .prefix(PrefixConfig::builder().locales(["en-US", "fr"]).build().unwrap())
///     .valid_paths(|path| path == "/about")
///     .build()
///     .unwrap();
/// assert_eq!(config.block(), "page");
/// ```
pub struct PjaxConfigBuilder {
    selector: String,
    block: String,
    mode: Mode,
    read_only: bool,
    body_limit: usize,
    prefix: Option<PrefixConfig>,
    is_valid_path: Option<PathValidator>,
}

impl PjaxConfigBuilder {
    /// Create a builder with sensible defaults.
    ///
    /// Defaults: selector `#page`, block `page`, lenient mode, writable,
    /// 8 MiB body limit, the default [`PrefixConfig`], and no valid paths.
    pub fn new() -> Self {
        Self {
            selector: "#page".to_string(),
            block: "page".to_string(),
            mode: Mode::default(),
            read_only: false,
            body_limit: 8 * 1024 * 1024,
            prefix: None,
            is_valid_path: None,
        }
    }

    /// CSS selector of the content region used for fragment extraction.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Name of the top-level template block rendered for Pjax requests.
    pub fn block(mut self, block: impl Into<String>) -> Self {
        self.block = block.into();
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Refuse every POST with the temporary-unavailability page.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Largest response body buffered for fragment extraction.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn prefix(mut self, prefix: PrefixConfig) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Route check used by the trailing-slash fallback.
    pub fn valid_paths(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        let validator: PathValidator = Arc::new(f);
        self.is_valid_path = Some(validator);
        self
    }

    pub fn build(self) -> Result<PjaxConfig> {
        if self.block.is_empty() {
            return Err(Error::Config("block name must not be empty".into()));
        }
        if self.body_limit == 0 {
            return Err(Error::Config("body limit must be positive".into()));
        }
        let prefix = match self.prefix {
            Some(prefix) => prefix,
            None => PrefixConfig::builder().build()?,
        };
        let is_valid_path: PathValidator = match self.is_valid_path {
            Some(validator) => validator,
            None => Arc::new(|_: &str| false),
        };

        Ok(PjaxConfig {
            extractor: FragmentExtractor::new(&self.selector)?,
            block: self.block,
            mode: self.mode,
            read_only: self.read_only,
            body_limit: self.body_limit,
            prefix,
            is_valid_path,
        })
    }
}

impl Default for PjaxConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = PjaxConfig::builder().build().unwrap();
        assert_eq!(config.selector(), "#page");
        assert_eq!(config.block(), "page");
        assert_eq!(config.mode(), Mode::Lenient);
        assert!(!config.read_only());
        assert_eq!(config.prefix().default_locale(), "en-US");
        assert!(!config.is_valid_path("/anything"));
    }

    #[test]
    fn invalid_selector_fails_build() {
        let err = PjaxConfig::builder().selector("[[[invalid").build().unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }

    #[test]
    fn empty_block_fails_build() {
        let err = PjaxConfig::builder().block("").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn path_validator_is_used() {
        let config = PjaxConfig::builder()
            .valid_paths(|p| p.starts_with("/addon/"))
            .build()
            .unwrap();
        assert!(config.is_valid_path("/addon/5457"));
        assert!(!config.is_valid_path("/addon"));
    }
}

//! Locale and application URL prefixes.
//!
//! Site URLs look like `/{locale}/{app}/rest/of/path`. Both leading segments
//! are optional. [`Prefixer`] strips whatever it recognises, remembers it, and
//! rebuilds the canonical path with [`Prefixer::fix`].

pub mod accept;

use crate::error::{Error, Result};

/// An application a URL can be scoped to, e.g. `firefox`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct App {
    /// Path segment used in URLs.
    pub short: String,
    /// Substring of the `User-Agent` header that identifies this app.
    pub user_agent: String,
}

/// Allow-lists and defaults for locale/app prefixes.
///
/// Built with [`PrefixConfig::builder`].
#[derive(Clone, Debug)]
pub struct PrefixConfig {
    locales: Vec<String>,
    apps: Vec<App>,
    default_locale: String,
    default_app: String,
    non_locale_roots: Vec<String>,
    non_app_roots: Vec<String>,
    hide_default_locale: bool,
    hide_default_app: bool,
}

impl PrefixConfig {
    pub fn builder() -> PrefixConfigBuilder {
        PrefixConfigBuilder::new()
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn apps(&self) -> &[App] {
        &self.apps
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn default_app(&self) -> &str {
        &self.default_app
    }

    /// Exact, case-sensitive locale check used on path segments.
    pub fn is_locale(&self, segment: &str) -> bool {
        self.locales.iter().any(|l| l == segment)
    }

    /// Exact, case-sensitive app check used on path segments.
    pub fn is_app(&self, segment: &str) -> bool {
        self.apps.iter().any(|a| a.short == segment)
    }

    /// Case-insensitive lookup used for `lang=` values and `Accept-Language`.
    pub fn locale_for(&self, lang: &str) -> Option<&str> {
        self.locales
            .iter()
            .find(|l| l.as_str() == lang)
            .or_else(|| self.locales.iter().find(|l| l.eq_ignore_ascii_case(lang)))
            .map(String::as_str)
    }

    /// Split a path into `(locale, app, shortened_path)`.
    ///
    /// The locale is tried first, then the app. Segments that are neither are
    /// left in the shortened path, which never has a leading slash.
    pub fn split_path<'a>(&self, path: &'a str) -> (&'a str, &'a str, &'a str) {
        let path = path.trim_start_matches('/');
        let (first, first_rest) = partition(path);

        if self.is_locale(first) {
            let (second, rest) = partition(first_rest);
            if self.is_app(second) {
                (first, second, rest)
            } else {
                (first, "", first_rest)
            }
        } else if self.is_app(first) {
            ("", first, first_rest)
        } else {
            ("", "", path)
        }
    }
}

fn partition(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}

/// Builder for [`PrefixConfig`].
///
/// Defaults: locale `en-US`, app `firefox` (detected by `Firefox` in the
/// `User-Agent`), no exempt roots, defaults always shown.
pub struct PrefixConfigBuilder {
    locales: Vec<String>,
    apps: Vec<App>,
    default_locale: String,
    default_app: String,
    non_locale_roots: Vec<String>,
    non_app_roots: Vec<String>,
    hide_default_locale: bool,
    hide_default_app: bool,
    custom_apps: bool,
}

impl PrefixConfigBuilder {
    pub fn new() -> Self {
        Self {
            locales: vec!["en-US".to_string()],
            apps: vec![App {
                short: "firefox".to_string(),
                user_agent: "Firefox".to_string(),
            }],
            default_locale: "en-US".to_string(),
            default_app: "firefox".to_string(),
            non_locale_roots: Vec::new(),
            non_app_roots: Vec::new(),
            hide_default_locale: false,
            hide_default_app: false,
            custom_apps: false,
        }
    }

    /// Replace the supported locale codes.
    pub fn locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locales = locales.into_iter().map(Into::into).collect();
        self
    }

    /// Register an app. Apps are matched against the `User-Agent` in the
    /// order they are added, so register the most specific ones first. The
    /// first call replaces the built-in `firefox` entry.
    pub fn app(mut self, short: impl Into<String>, user_agent: impl Into<String>) -> Self {
        if !self.custom_apps {
            self.apps.clear();
            self.custom_apps = true;
        }
        self.apps.push(App {
            short: short.into(),
            user_agent: user_agent.into(),
        });
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn default_app(mut self, app: impl Into<String>) -> Self {
        self.default_app = app.into();
        self
    }

    /// A path root that never gets a locale segment (e.g. `services`).
    pub fn non_locale_root(mut self, root: impl Into<String>) -> Self {
        self.non_locale_roots.push(root.into());
        self
    }

    /// A path root that never gets an app segment (e.g. `developers`).
    pub fn non_app_root(mut self, root: impl Into<String>) -> Self {
        self.non_app_roots.push(root.into());
        self
    }

    /// Leave the default locale out of canonical paths. A path without a
    /// locale then always means the default locale.
    pub fn hide_default_locale(mut self, hide: bool) -> Self {
        self.hide_default_locale = hide;
        self
    }

    /// Leave the default app out of canonical paths.
    pub fn hide_default_app(mut self, hide: bool) -> Self {
        self.hide_default_app = hide;
        self
    }

    pub fn build(self) -> Result<PrefixConfig> {
        if self.locales.is_empty() {
            return Err(Error::Config("at least one locale is required".into()));
        }
        if self.apps.is_empty() {
            return Err(Error::Config("at least one app is required".into()));
        }
        if !self.locales.contains(&self.default_locale) {
            return Err(Error::Config(format!(
                "default locale {:?} is not a supported locale",
                self.default_locale
            )));
        }
        if !self.apps.iter().any(|a| a.short == self.default_app) {
            return Err(Error::Config(format!(
                "default app {:?} is not a supported app",
                self.default_app
            )));
        }
        if let Some(clash) = self
            .apps
            .iter()
            .find(|a| self.locales.contains(&a.short))
        {
            return Err(Error::Config(format!(
                "{:?} is both a locale and an app",
                clash.short
            )));
        }
        if let Some(bad) = self
            .locales
            .iter()
            .map(String::as_str)
            .chain(self.apps.iter().map(|a| a.short.as_str()))
            .find(|s| s.is_empty() || s.contains('/'))
        {
            return Err(Error::Config(format!("invalid path segment {bad:?}")));
        }

        Ok(PrefixConfig {
            locales: self.locales,
            apps: self.apps,
            default_locale: self.default_locale,
            default_app: self.default_app,
            non_locale_roots: self.non_locale_roots,
            non_app_roots: self.non_app_roots,
            hide_default_locale: self.hide_default_locale,
            hide_default_app: self.hide_default_app,
        })
    }
}

impl Default for PrefixConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Locale/app state for a single request.
///
/// `locale` and `app` are empty when the path did not carry them; [`fix`]
/// then falls back on the request's `lang` parameter, `Accept-Language`,
/// `User-Agent`, or the configured defaults.
///
/// [`fix`]: Prefixer::fix
#[derive(Clone, Debug)]
pub struct Prefixer<'c> {
    config: &'c PrefixConfig,
    pub locale: String,
    pub app: String,
    pub shortened_path: String,
    lang: Option<String>,
    accept_language: Option<String>,
    user_agent: Option<String>,
}

impl<'c> Prefixer<'c> {
    /// Split `path` and remember the locale/app it carried.
    pub fn new(config: &'c PrefixConfig, path: &str) -> Self {
        let (locale, app, shortened) = config.split_path(path);
        Self {
            config,
            locale: locale.to_string(),
            app: app.to_string(),
            shortened_path: shortened.to_string(),
            lang: None,
            accept_language: None,
            user_agent: None,
        }
    }

    /// Value of the `lang` query parameter, if any.
    pub fn with_lang(mut self, lang: Option<&str>) -> Self {
        self.lang = lang.map(str::to_string);
        self
    }

    pub fn with_accept_language(mut self, header: Option<&str>) -> Self {
        self.accept_language = header.map(str::to_string);
        self
    }

    pub fn with_user_agent(mut self, header: Option<&str>) -> Self {
        self.user_agent = header.map(str::to_string);
        self
    }

    pub fn config(&self) -> &PrefixConfig {
        self.config
    }

    /// Best locale for this request ignoring the path: `lang`, then
    /// `Accept-Language`, then the default.
    pub fn language(&self) -> String {
        if let Some(locale) = self.lang_locale() {
            return locale;
        }
        self.accept_language
            .as_deref()
            .and_then(|header| accept::best_locale(header, self.config))
            .unwrap_or_else(|| self.config.default_locale.clone())
    }

    /// Best app for this request ignoring the path: the first app whose
    /// marker appears in the `User-Agent`, else the default.
    pub fn detect_app(&self) -> String {
        self.user_agent
            .as_deref()
            .and_then(|ua| {
                self.config
                    .apps
                    .iter()
                    .find(|app| ua.contains(app.user_agent.as_str()))
            })
            .map(|app| app.short.clone())
            .unwrap_or_else(|| self.config.default_app.clone())
    }

    fn lang_locale(&self) -> Option<String> {
        self.lang
            .as_deref()
            .and_then(|lang| self.config.locale_for(lang))
            .map(str::to_string)
    }

    /// The locale [`fix`](Self::fix) writes: the path's own, else the detected one.
    pub fn effective_locale(&self) -> String {
        if !self.locale.is_empty() {
            return self.locale.clone();
        }
        if self.config.hide_default_locale {
            return self
                .lang_locale()
                .unwrap_or_else(|| self.config.default_locale.clone());
        }
        self.language()
    }

    /// The app [`fix`](Self::fix) writes: the path's own, else the detected one.
    pub fn effective_app(&self) -> String {
        if !self.app.is_empty() {
            return self.app.clone();
        }
        if self.config.hide_default_app {
            return self.config.default_app.clone();
        }
        self.detect_app()
    }

    /// Canonical form of `path` with this request's locale and app.
    ///
    /// A hidden default is still written out when leaving it away would let
    /// the path's own first segment be read back as a locale or app.
    pub fn fix(&self, path: &str) -> String {
        let config = self.config;
        let path = path.trim_start_matches('/');
        let (root, _) = partition(path);

        let app = if config.non_app_roots.iter().any(|r| r == root) {
            None
        } else {
            let app = self.effective_app();
            let hidden = config.hide_default_app
                && app == config.default_app
                && !config.is_app(root);
            (!hidden).then_some(app)
        };
        let locale = if config.non_locale_roots.iter().any(|r| r == root) {
            None
        } else {
            let locale = self.effective_locale();
            let hidden = config.hide_default_locale
                && locale == config.default_locale
                && !(app.is_none() && config.is_locale(root));
            (!hidden).then_some(locale)
        };

        let mut parts: Vec<String> = vec![String::new()];
        parts.extend(locale);
        parts.extend(app);
        parts.push(path.to_string());
        parts.join("/")
    }

    /// Canonical form of the request's own path.
    pub fn canonical_path(&self) -> String {
        self.fix(&self.shortened_path)
    }
}

//! Pjax fragment extraction.
//!
//! A full page is parsed, its `<title>` and the children of the content
//! element are re-serialized, and the result replaces the response body so the
//! client can inject it into the existing DOM.

pub mod serialize;

use scraper::{Html, Selector};
use tokio::time::Instant;

use crate::config::Mode;
use crate::error::{Error, Result};

pub use serialize::{escape_text, serialize_node};

/// Serialized pieces of a page, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    snippets: Vec<String>,
    found_content: bool,
}

impl Fragment {
    /// The `<title>` elements and content children, one snippet each.
    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }

    /// Whether any element matched the content selector.
    pub fn found_content(&self) -> bool {
        self.found_content
    }

    /// Concatenate the snippets with no separator.
    pub fn into_html(self) -> String {
        self.snippets.concat()
    }
}

/// Extracts the title and content region from full HTML documents.
///
/// # Example
///
/// ```
/// use lazypjax::FragmentExtractor;
///
/// let extractor = FragmentExtractor::new("#page").unwrap();
/// let html = r#"<html><title>Foo</title><body><div id="page">the page</div></body></html>"#;
/// assert_eq!(extractor.extract(html).into_html(), "<title>Foo</title>the page");
/// ```
#[derive(Debug)]
pub struct FragmentExtractor {
    selector: Selector,
    content_selector: String,
}

impl FragmentExtractor {
    /// Build an extractor for the given content selector.
    ///
    /// Returns [`Error::InvalidSelector`] if the selector does not parse.
    pub fn new(content_selector: &str) -> Result<Self> {
        let combined = format!("title,{content_selector}");
        let selector = Selector::parse(&combined).map_err(|e| Error::InvalidSelector {
            selector: content_selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            selector,
            content_selector: content_selector.to_string(),
        })
    }

    pub fn content_selector(&self) -> &str {
        &self.content_selector
    }

    /// Extract the fragment from `html`. The result is empty and
    /// [`Fragment::found_content`] is `false` when nothing matched.
    pub fn extract(&self, html: &str) -> Fragment {
        let document = Html::parse_document(html);
        let mut fragment = Fragment::default();

        for element in document.select(&self.selector) {
            if element.value().name() == "title" {
                let mut out = String::new();
                serialize_node(*element, &mut out);
                fragment.snippets.push(out);
                continue;
            }

            fragment.found_content = true;
            // Leading text comes first since it is the first child node.
            for child in element.children() {
                let mut out = String::new();
                serialize_node(child, &mut out);
                fragment.snippets.push(out);
            }
        }

        fragment
    }

    /// Turn a full page into a fragment.
    ///
    /// Returns `Ok(Some(fragment))` on success. When the content selector
    /// matches nothing, strict mode fails with [`Error::MissingSelector`]
    /// and lenient mode logs the problem and returns `Ok(None)` so the
    /// caller keeps the original page.
    pub fn process(&self, html: &str, mode: Mode, path: &str) -> Result<Option<String>> {
        let started = Instant::now();
        let fragment = self.extract(html);
        tracing::debug!(
            target: "pjax",
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "pjax.parse"
        );

        if fragment.found_content() {
            return Ok(Some(fragment.into_html()));
        }

        let err = Error::MissingSelector {
            path: path.to_string(),
            selector: self.content_selector.clone(),
        };
        match mode {
            Mode::Strict => Err(err),
            Mode::Lenient => {
                tracing::error!(target: "pjax", "{err}");
                Ok(None)
            }
        }
    }
}

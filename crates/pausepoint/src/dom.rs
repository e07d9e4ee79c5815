//! Read-only DOM snapshot access.
//!
//! The extraction engine only ever sees a page through [`DomSnapshot`]: ordered
//! element lookup by CSS locator, the document title and the rendered body
//! text. [`HtmlSnapshot`] implements it over `scraper`. Its types are `!Send`,
//! so a snapshot stays on the page-context task that parsed it.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{PausepointError, PausepointResult};

/// A validated CSS selector.
#[derive(Debug, Clone)]
pub struct Locator {
    source: String,
    selector: Selector,
}

impl Locator {
    /// Parse a CSS selector string.
    pub fn parse(source: &str) -> PausepointResult<Self> {
        let selector = Selector::parse(source)
            .map_err(|e| PausepointError::InvalidSelector(format!("{source}: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    /// The selector text this locator was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// An owned view of one element: tag, collapsed text and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementView {
    tag: String,
    text: String,
    attributes: Vec<(String, String)>,
}

impl ElementView {
    /// Build a view directly, mainly for hosts that synthesise interaction
    /// targets and for tests.
    pub fn new(tag: &str, text: &str, attributes: &[(&str, &str)]) -> Self {
        Self {
            tag: tag.to_string(),
            text: collapse_whitespace(text),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn from_element(el: &ElementRef<'_>) -> Self {
        Self {
            tag: el.value().name().to_string(),
            text: element_text(el),
            attributes: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Visible text content, trimmed and whitespace-collapsed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `class` attribute, or empty.
    pub fn class_name(&self) -> &str {
        self.attribute("class").unwrap_or("")
    }

    /// The `id` attribute, or empty.
    pub fn id(&self) -> &str {
        self.attribute("id").unwrap_or("")
    }
}

/// Queryable snapshot of a rendered page.
pub trait DomSnapshot {
    /// Every element matching `locator`, in document order.
    fn query_all(&self, locator: &Locator) -> Vec<ElementView>;

    /// The document's `<title>` text, or empty.
    fn title(&self) -> String;

    /// Full rendered text of `<body>`, whitespace-collapsed.
    fn body_text(&self) -> String;

    /// Address of the page the snapshot was taken from.
    fn url(&self) -> &Url;
}

/// [`DomSnapshot`] backed by a parsed HTML document.
pub struct HtmlSnapshot {
    document: Html,
    url: Url,
}

impl HtmlSnapshot {
    /// Parse raw HTML taken from `url`.
    pub fn parse(html: &str, url: &str) -> PausepointResult<Self> {
        Ok(Self::from_parts(html, Url::parse(url)?))
    }

    /// Parse raw HTML for an already-parsed URL.
    pub fn from_parts(html: &str, url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            url,
        }
    }

    /// First element matching `locator`, if any.
    pub fn first(&self, locator: &Locator) -> Option<ElementView> {
        self.document
            .select(locator.selector())
            .next()
            .map(|el| ElementView::from_element(&el))
    }
}

impl DomSnapshot for HtmlSnapshot {
    fn query_all(&self, locator: &Locator) -> Vec<ElementView> {
        self.document
            .select(locator.selector())
            .map(|el| ElementView::from_element(&el))
            .collect()
    }

    fn title(&self) -> String {
        let Ok(sel) = Selector::parse("title") else {
            return String::new();
        };
        self.document
            .select(&sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default()
    }

    fn body_text(&self) -> String {
        if let Ok(sel) = Selector::parse("body") {
            if let Some(body) = self.document.select(&sel).next() {
                return element_text(&body);
            }
        }
        String::new()
    }

    fn url(&self) -> &Url {
        &self.url
    }
}

/// The element's text content, trimmed and whitespace-collapsed.
///
/// Text nodes are concatenated as-is so `$19<sup>.99</sup>` reads `$19.99`.
fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

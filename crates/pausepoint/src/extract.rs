//! Heuristic price and product-name extraction over a DOM snapshot.
//!
//! Both targets walk an ordered rule list and stop at the first acceptable
//! value: first rule, then first element of that rule in document order. Only
//! when every rule misses does the engine fall back to coarser signals (a
//! page-wide money scan for price, the document title for the name), because
//! unrelated amounts such as shipping estimates or prices quoted in reviews
//! tend to appear later and more often than the real price container.
//!
//! Everything here is synchronous and side-effect free: the interceptor needs
//! an answer inside the same event turn. Calling [`extract`] twice on the same
//! snapshot yields the same result.

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{DomSnapshot, ElementView};
use crate::rules::{rules_for, ExtractionStrategy, SelectorRule};
use crate::site::SiteVariant;
use crate::types::{Detection, FALLBACK_PRODUCT_NAME, MAX_PRODUCT_NAME_CHARS};

/// Name candidates must be strictly longer than this many characters.
const MIN_NAME_CHARS: usize = 3;

/// Separator between the product segment and the site segment of a title.
const TITLE_SEPARATOR: char = '|';

/// Optional currency symbol, integer digits, optional one- or two-digit
/// fraction. Applied to a single element's text.
fn leading_money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$?(\d+(?:\.\d{1,2})?)").expect("money regex is valid"))
}

/// Page-wide variant: the currency symbol is mandatory so bare numbers in
/// running text (quantities, model numbers) are not mistaken for prices.
fn page_money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s?(\d+(?:\.\d{1,2})?)").expect("page money regex is valid"))
}

/// Output of one extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Best-effort price, `None` when nothing passed the domain check.
    pub price: Option<f64>,
    /// Best-effort product name, never empty.
    pub product_name: String,
}

impl Extraction {
    /// Turn the pass into a [`Detection`] if a price was found.
    pub fn into_detection(self, source_url: &str, origin: SiteVariant) -> Option<Detection> {
        let price = self.price?;
        Some(Detection {
            price,
            product_name: self.product_name,
            source_url: source_url.to_string(),
            origin,
        })
    }
}

/// Run both price and name extraction for `variant`.
pub fn extract(snapshot: &dyn DomSnapshot, variant: SiteVariant) -> Extraction {
    let extraction = Extraction {
        price: extract_price(snapshot, variant),
        product_name: extract_product_name(snapshot, variant),
    };
    tracing::debug!(
        variant = %variant,
        price = ?extraction.price,
        name = %extraction.product_name,
        "extraction pass complete"
    );
    extraction
}

/// Extract a price in `(0, 10000)`.
///
/// The marketplace variant tries its own rules, then re-runs the whole generic
/// algorithm (generic rules, then the page-wide scan).
pub fn extract_price(snapshot: &dyn DomSnapshot, variant: SiteVariant) -> Option<f64> {
    match variant {
        SiteVariant::Marketplace => {
            price_from_rules(snapshot, &rules_for(SiteVariant::Marketplace).price)
                .or_else(|| extract_price(snapshot, SiteVariant::Generic))
        }
        SiteVariant::Generic => price_from_rules(snapshot, &rules_for(SiteVariant::Generic).price)
            .or_else(|| scan_page_prices(&snapshot.body_text()).next()),
    }
}

/// Walk `rules` in priority order; the first element yielding an in-domain
/// price wins and no further rules are consulted.
pub fn price_from_rules(snapshot: &dyn DomSnapshot, rules: &[SelectorRule]) -> Option<f64> {
    for rule in rules {
        for element in snapshot.query_all(&rule.locator) {
            if let Some(price) = price_from_element(&element, rule.strategy) {
                tracing::debug!(locator = rule.locator.as_str(), price, "price rule matched");
                return Some(price);
            }
        }
    }
    None
}

fn price_from_element(element: &ElementView, strategy: ExtractionStrategy) -> Option<f64> {
    let from_text = parse_leading_money(element.text());
    match strategy {
        ExtractionStrategy::TextContent => from_text,
        ExtractionStrategy::TextThenDataPrice => from_text.or_else(|| {
            element
                .attribute("data-price")
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|p| Detection::price_in_domain(*p))
        }),
    }
}

/// First money-pattern occurrence in `text`, accepted only inside the price
/// domain. Later occurrences in the same text are not considered.
pub fn parse_leading_money(text: &str) -> Option<f64> {
    let caps = leading_money_re().captures(text)?;
    caps.get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|p| Detection::price_in_domain(*p))
}

/// Every in-domain `$` amount in `text`, in order of appearance.
pub fn scan_page_prices(text: &str) -> impl Iterator<Item = f64> + '_ {
    page_money_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()))
        .filter(|p| Detection::price_in_domain(*p))
}

/// Extract a product name; falls back to the title, then to `"Product"`.
///
/// The marketplace variant tries its own rules before the generic ones.
pub fn extract_product_name(snapshot: &dyn DomSnapshot, variant: SiteVariant) -> String {
    let from_rules = match variant {
        SiteVariant::Marketplace => {
            name_from_rules(snapshot, &rules_for(SiteVariant::Marketplace).name)
                .or_else(|| name_from_rules(snapshot, &rules_for(SiteVariant::Generic).name))
        }
        SiteVariant::Generic => name_from_rules(snapshot, &rules_for(SiteVariant::Generic).name),
    };

    from_rules
        .or_else(|| name_from_title(&snapshot.title()))
        .unwrap_or_else(|| FALLBACK_PRODUCT_NAME.to_string())
}

/// First element text whose length is strictly between 3 and 200 characters.
pub fn name_from_rules(snapshot: &dyn DomSnapshot, rules: &[SelectorRule]) -> Option<String> {
    for rule in rules {
        for element in snapshot.query_all(&rule.locator) {
            let text = element.text().trim();
            let len = text.chars().count();
            if len > MIN_NAME_CHARS && len < MAX_PRODUCT_NAME_CHARS {
                tracing::debug!(locator = rule.locator.as_str(), "name rule matched");
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Leading title segment before `|`, if it is longer than 3 characters.
pub fn name_from_title(title: &str) -> Option<String> {
    let segment = title.split(TITLE_SEPARATOR).next()?.trim();
    if segment.chars().count() > MIN_NAME_CHARS {
        Some(segment.chars().take(MAX_PRODUCT_NAME_CHARS).collect())
    } else {
        None
    }
}

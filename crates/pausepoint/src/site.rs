//! Site-variant classification.
//!
//! Decides once per navigation which selector-rule set the extraction engine
//! uses. Mutations never change the variant.

use serde::{Deserialize, Serialize};
use url::Url;

/// Host fragment identifying the designated marketplace.
pub const MARKETPLACE_HOST: &str = "amazon.com";

/// Path-segment markers of a marketplace product page.
pub const MARKETPLACE_PRODUCT_PATHS: &[&str] = &["/dp/", "/gp/product/", "/product-reviews/"];

/// Shopping domains the page agent is expected to be attached to.
pub const SHOPPING_DOMAINS: &[&str] = &[
    "amazon.com",
    "ebay.com",
    "walmart.com",
    "target.com",
    "bestbuy.com",
    "etsy.com",
    "newegg.com",
    "homedepot.com",
    "wayfair.com",
    "macys.com",
    "nordstrom.com",
    "zappos.com",
    "costco.com",
];

/// Which selector-rule set is active. Doubles as a detection's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteVariant {
    #[serde(rename = "marketplace-specific")]
    Marketplace,
    #[serde(rename = "generic")]
    Generic,
}

impl SiteVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteVariant::Marketplace => "marketplace-specific",
            SiteVariant::Generic => "generic",
        }
    }
}

impl std::fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a page: marketplace host *and* a product-page path, else generic.
pub fn classify(url: &Url) -> SiteVariant {
    let host = url.host_str().unwrap_or("").to_lowercase();
    let path = url.path();
    let on_marketplace = host_matches(&host, MARKETPLACE_HOST);
    let product_page = MARKETPLACE_PRODUCT_PATHS
        .iter()
        .any(|marker| path.contains(marker));

    if on_marketplace && product_page {
        SiteVariant::Marketplace
    } else {
        SiteVariant::Generic
    }
}

/// Whether the page belongs to one of [`SHOPPING_DOMAINS`].
pub fn is_shopping_site(url: &Url) -> bool {
    let host = url.host_str().unwrap_or("").to_lowercase();
    SHOPPING_DOMAINS.iter().any(|d| host_matches(&host, d))
}

/// `host` is `domain` itself or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

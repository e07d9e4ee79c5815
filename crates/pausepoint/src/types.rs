//! Core detection data types.

use serde::{Deserialize, Serialize};

use crate::site::SiteVariant;

/// Prices at or above this ceiling are treated as absent, not clamped.
pub const MAX_PRICE: f64 = 10_000.0;

/// Upper bound on the length of a product name, in characters.
pub const MAX_PRODUCT_NAME_CHARS: usize = 200;

/// Returned when no name rule, and not the page title, yields a product name.
pub const FALLBACK_PRODUCT_NAME: &str = "Product";

/// Result of one extraction pass that found a price.
///
/// Detections are immutable. A newer detection supersedes an older one; the
/// two are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub price: f64,
    pub product_name: String,
    pub source_url: String,
    pub origin: SiteVariant,
}

impl Detection {
    /// Whether `price` lies in the accepted open interval `(0, MAX_PRICE)`.
    pub fn price_in_domain(price: f64) -> bool {
        price.is_finite() && price > 0.0 && price < MAX_PRICE
    }
}

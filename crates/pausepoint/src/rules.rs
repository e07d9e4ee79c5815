//! Declarative selector rules.
//!
//! Rules are data, not code: a locator plus an [`ExtractionStrategy`], kept in
//! priority order per target (price, product name) and per [`SiteVariant`].
//! The tables are embedded from `selector_rules.json` at compile time and
//! compiled once on first use. A locator that fails to parse is dropped with a
//! warning rather than poisoning the whole table.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::dom::Locator;
use crate::site::SiteVariant;

/// Raw JSON content of the rule tables, embedded at compile time so there is
/// no runtime file I/O.
const RULES_JSON: &str = include_str!("selector_rules.json");

/// How a value is read out of an element matched by a rule's locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Match against the element's visible text only.
    TextContent,
    /// Visible text first; if that yields nothing usable, the element's
    /// `data-price` attribute.
    TextThenDataPrice,
}

/// One (locator, strategy) pair.
#[derive(Debug, Clone)]
pub struct SelectorRule {
    pub locator: Locator,
    pub strategy: ExtractionStrategy,
}

impl SelectorRule {
    pub fn new(locator: Locator, strategy: ExtractionStrategy) -> Self {
        Self { locator, strategy }
    }
}

/// Ordered rules for every detection target of one site variant.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub price: Vec<SelectorRule>,
    pub name: Vec<SelectorRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    locator: String,
    strategy: ExtractionStrategy,
}

#[derive(Debug, Deserialize)]
struct RawRuleSet {
    price: Vec<RawRule>,
    name: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawTables {
    marketplace: RawRuleSet,
    generic: RawRuleSet,
}

struct RuleTables {
    marketplace: RuleSet,
    generic: RuleSet,
}

fn tables() -> &'static RuleTables {
    static TABLES: OnceLock<RuleTables> = OnceLock::new();
    TABLES.get_or_init(|| match serde_json::from_str::<RawTables>(RULES_JSON) {
        Ok(raw) => RuleTables {
            marketplace: compile(raw.marketplace),
            generic: compile(raw.generic),
        },
        Err(e) => {
            tracing::error!("embedded selector rules are malformed: {e}");
            RuleTables {
                marketplace: RuleSet::default(),
                generic: RuleSet::default(),
            }
        }
    })
}

fn compile(raw: RawRuleSet) -> RuleSet {
    RuleSet {
        price: compile_rules(raw.price),
        name: compile_rules(raw.name),
    }
}

fn compile_rules(raw: Vec<RawRule>) -> Vec<SelectorRule> {
    raw.into_iter()
        .filter_map(|r| match Locator::parse(&r.locator) {
            Ok(locator) => Some(SelectorRule::new(locator, r.strategy)),
            Err(e) => {
                tracing::warn!("skipping selector rule: {e}");
                None
            }
        })
        .collect()
}

/// The rule set used for `variant`.
pub fn rules_for(variant: SiteVariant) -> &'static RuleSet {
    let t = tables();
    match variant {
        SiteVariant::Marketplace => &t.marketplace,
        SiteVariant::Generic => &t.generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_tables_compile_completely() {
        let raw: RawTables = serde_json::from_str(RULES_JSON).unwrap();
        assert_eq!(rules_for(SiteVariant::Marketplace).price.len(), raw.marketplace.price.len());
        assert_eq!(rules_for(SiteVariant::Marketplace).name.len(), raw.marketplace.name.len());
        assert_eq!(rules_for(SiteVariant::Generic).price.len(), raw.generic.price.len());
        assert_eq!(rules_for(SiteVariant::Generic).name.len(), raw.generic.name.len());
    }

    #[test]
    fn test_marketplace_price_rules_lead_with_dedicated_containers() {
        let rules = &rules_for(SiteVariant::Marketplace).price;
        assert_eq!(rules[0].locator.as_str(), "#priceblock_ourprice");
        assert!(rules
            .iter()
            .all(|r| r.strategy == ExtractionStrategy::TextContent));
    }

    #[test]
    fn test_generic_price_rules_read_data_price() {
        let rules = &rules_for(SiteVariant::Generic).price;
        assert_eq!(rules[0].locator.as_str(), ".price");
        assert!(rules
            .iter()
            .all(|r| r.strategy == ExtractionStrategy::TextThenDataPrice));
    }

    #[test]
    fn test_generic_name_rules_start_with_heading() {
        assert_eq!(rules_for(SiteVariant::Generic).name[0].locator.as_str(), "h1");
    }

    #[test]
    fn test_bad_locator_is_skipped() {
        let compiled = compile_rules(vec![
            RawRule {
                locator: "[[broken".to_string(),
                strategy: ExtractionStrategy::TextContent,
            },
            RawRule {
                locator: ".ok".to_string(),
                strategy: ExtractionStrategy::TextContent,
            },
        ]);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].locator.as_str(), ".ok");
    }
}

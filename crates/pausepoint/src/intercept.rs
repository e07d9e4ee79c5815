//! Purchase-intent interception.
//!
//! The host registers [`Interceptor::on_interaction`] in the capture phase so
//! it runs before the page's own handlers. A checkout-looking interaction is
//! suppressed only when the extraction engine can back it with a price;
//! otherwise it passes through untouched and nothing is relayed.

use crate::dom::{DomSnapshot, ElementView};
use crate::extract::extract;
use crate::relay::{RelayMessage, RelaySender};
use crate::site::SiteVariant;
use crate::types::Detection;

/// Phrases that mark an interaction as checkout intent.
pub const PURCHASE_KEYWORDS: &[&str] = &[
    "add to cart",
    "buy now",
    "checkout",
    "purchase",
    "place order",
    "complete order",
    "submit order",
    "pay now",
    "proceed to checkout",
];

/// DOM event propagation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Capture,
    Target,
    Bubble,
}

/// Host-provided pointer/activation event.
pub trait InteractionEvent {
    fn target(&self) -> &ElementView;
    fn phase(&self) -> InteractionPhase;
    fn prevent_default(&mut self);
    fn stop_propagation(&mut self);
}

/// A click as seen by a host without a live browser.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    target: ElementView,
    phase: InteractionPhase,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl ClickEvent {
    /// A click being dispatched through the capture phase.
    pub fn capture(target: ElementView) -> Self {
        Self::in_phase(target, InteractionPhase::Capture)
    }

    pub fn in_phase(target: ElementView, phase: InteractionPhase) -> Self {
        Self {
            target,
            phase,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

impl InteractionEvent for ClickEvent {
    fn target(&self) -> &ElementView {
        &self.target
    }

    fn phase(&self) -> InteractionPhase {
        self.phase
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Classification of one interaction. Not retained after emission.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptedAction {
    pub purchase_intent: bool,
    pub detection: Option<Detection>,
}

impl InterceptedAction {
    fn ignored() -> Self {
        Self {
            purchase_intent: false,
            detection: None,
        }
    }

    /// Whether the interaction's default effect was suppressed.
    pub fn suppressed(&self) -> bool {
        self.detection.is_some()
    }
}

/// Whether the element's text, class or id contains a checkout phrase.
///
/// Class and id tokens are usually hyphenated (`add-to-cart-btn`), so `-` and
/// `_` are read as spaces there.
pub fn is_purchase_intent(target: &ElementView) -> bool {
    let text = target.text().to_lowercase();
    let class = normalize_identifier(target.class_name());
    let id = normalize_identifier(target.id());

    PURCHASE_KEYWORDS
        .iter()
        .any(|kw| text.contains(kw) || class.contains(kw) || id.contains(kw))
}

fn normalize_identifier(raw: &str) -> String {
    raw.to_lowercase().replace(['-', '_'], " ")
}

/// Capture-phase interaction handler for one page.
#[derive(Debug, Clone)]
pub struct Interceptor {
    variant: SiteVariant,
    relay: RelaySender,
}

impl Interceptor {
    pub fn new(variant: SiteVariant, relay: RelaySender) -> Self {
        Self { variant, relay }
    }

    /// Classify the interaction and, when it is checkout intent backed by a
    /// price, suppress it and relay `purchase-detected`.
    ///
    /// Runs to completion synchronously; suppression happens before this
    /// returns, so the page's navigation cannot race the relay.
    pub fn on_interaction(
        &self,
        snapshot: &dyn DomSnapshot,
        event: &mut dyn InteractionEvent,
    ) -> InterceptedAction {
        if event.phase() != InteractionPhase::Capture {
            tracing::debug!(phase = ?event.phase(), "ignoring interaction outside capture phase");
            return InterceptedAction::ignored();
        }
        if !is_purchase_intent(event.target()) {
            return InterceptedAction::ignored();
        }

        let source_url = snapshot.url().to_string();
        let detection = extract(snapshot, self.variant).into_detection(&source_url, self.variant);

        match detection {
            Some(detection) => {
                event.prevent_default();
                event.stop_propagation();
                tracing::info!(
                    price = detection.price,
                    product = %detection.product_name,
                    "purchase intent intercepted"
                );
                self.relay.send(RelayMessage::purchase(&detection));
                InterceptedAction {
                    purchase_intent: true,
                    detection: Some(detection),
                }
            }
            None => {
                tracing::debug!("purchase intent without a price; letting it through");
                InterceptedAction {
                    purchase_intent: true,
                    detection: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlSnapshot;
    use crate::relay::relay_channel;

    #[test]
    fn test_keyword_matches_text_class_and_id() {
        assert!(is_purchase_intent(&ElementView::new("button", "Add to Cart", &[])));
        assert!(is_purchase_intent(&ElementView::new("a", "", &[("class", "btn add-to-cart-btn")])));
        assert!(is_purchase_intent(&ElementView::new("a", "", &[("id", "place_order")])));
        assert!(is_purchase_intent(&ElementView::new("button", "BUY NOW", &[])));
        assert!(is_purchase_intent(&ElementView::new("div", "", &[("class", "Checkout-link")])));
    }

    #[test]
    fn test_non_purchase_elements() {
        assert!(!is_purchase_intent(&ElementView::new("button", "Add to wishlist", &[])));
        assert!(!is_purchase_intent(&ElementView::new("a", "Reviews", &[("class", "nav-link")])));
    }

    #[test]
    fn test_suppresses_when_price_found() {
        let snap = HtmlSnapshot::parse(
            r#"<html><body><h1>Desk Chair</h1><span class="price">$149.00</span></body></html>"#,
            "https://shop.example.com/chair",
        )
        .unwrap();
        let (tx, mut rx) = relay_channel();
        let interceptor = Interceptor::new(SiteVariant::Generic, tx);
        let mut event = ClickEvent::capture(ElementView::new("button", "Buy now", &[]));

        let action = interceptor.on_interaction(&snap, &mut event);

        assert!(action.purchase_intent);
        assert!(action.suppressed());
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
        let sent = rx.try_recv().unwrap().message;
        assert_eq!(sent.kind(), "purchase-detected");
        assert_eq!(sent.payload().price, 149.0);
        assert_eq!(sent.payload().product_name, "Desk Chair");
        assert_eq!(sent.payload().product_url, "https://shop.example.com/chair");
    }

    #[test]
    fn test_passes_through_without_price() {
        let snap = HtmlSnapshot::parse(
            "<html><body><h1>Gift card</h1></body></html>",
            "https://shop.example.com/gift",
        )
        .unwrap();
        let (tx, mut rx) = relay_channel();
        let interceptor = Interceptor::new(SiteVariant::Generic, tx);
        let mut event = ClickEvent::capture(ElementView::new("button", "Checkout", &[]));

        let action = interceptor.on_interaction(&snap, &mut event);

        assert!(action.purchase_intent);
        assert!(!action.suppressed());
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_non_purchase_click_untouched() {
        let snap = HtmlSnapshot::parse(
            r#"<html><body><span class="price">$20</span></body></html>"#,
            "https://shop.example.com/x",
        )
        .unwrap();
        let (tx, mut rx) = relay_channel();
        let interceptor = Interceptor::new(SiteVariant::Generic, tx);
        let mut event = ClickEvent::capture(ElementView::new("a", "Size guide", &[]));

        let action = interceptor.on_interaction(&snap, &mut event);
        assert!(!action.purchase_intent);
        assert!(!event.default_prevented());
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_bubble_phase_is_ignored() {
        let snap = HtmlSnapshot::parse(
            r#"<html><body><span class="price">$20</span></body></html>"#,
            "https://shop.example.com/x",
        )
        .unwrap();
        let (tx, mut rx) = relay_channel();
        let interceptor = Interceptor::new(SiteVariant::Generic, tx);
        let mut event =
            ClickEvent::in_phase(ElementView::new("button", "Buy now", &[]), InteractionPhase::Bubble);

        interceptor.on_interaction(&snap, &mut event);
        assert!(!event.default_prevented());
        assert!(rx.try_recv().is_none());
    }
}

//! Cross-context relay from a page context to the coordinator.
//!
//! Messages are fire-and-forget: [`RelaySender::send`] never blocks and returns
//! nothing the caller could depend on. Delivery is at-most-once with no retry;
//! a message sent after the coordinator is gone is logged and dropped.
//! Messages from one sender arrive in send order.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::{PausepointError, PausepointResult};
use crate::types::Detection;

/// Payload shared by every detection message kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionPayload {
    pub price: f64,
    pub product_name: String,
    pub product_url: String,
}

impl From<&Detection> for DetectionPayload {
    fn from(d: &Detection) -> Self {
        Self {
            price: d.price,
            product_name: d.product_name.clone(),
            product_url: d.source_url.clone(),
        }
    }
}

/// Every message a page context sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelayMessage {
    /// A checkout-intent interaction was intercepted and suppressed.
    PurchaseDetected(DetectionPayload),
    /// A product price was recognised at page load.
    ProductDetected(DetectionPayload),
}

impl RelayMessage {
    pub fn purchase(detection: &Detection) -> Self {
        Self::PurchaseDetected(detection.into())
    }

    pub fn product(detection: &Detection) -> Self {
        Self::ProductDetected(detection.into())
    }

    pub fn payload(&self) -> &DetectionPayload {
        match self {
            Self::PurchaseDetected(p) | Self::ProductDetected(p) => p,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PurchaseDetected(_) => "purchase-detected",
            Self::ProductDetected(_) => "product-detected",
        }
    }
}

/// Status token in a coordinator acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    ShowingAlert,
}

/// Coordinator acknowledgement, `{"status":"showing_alert"}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAck {
    pub status: AckStatus,
}

impl RelayAck {
    pub fn showing_alert() -> Self {
        Self {
            status: AckStatus::ShowingAlert,
        }
    }
}

/// A message in flight, with an optional slot for the acknowledgement.
#[derive(Debug)]
pub struct Envelope {
    pub message: RelayMessage,
    pub ack: Option<oneshot::Sender<RelayAck>>,
}

/// Page-context end of the relay. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<Envelope>,
}

/// Coordinator end of the relay.
#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

/// Create a connected sender/receiver pair.
pub fn relay_channel() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelaySender { tx }, RelayReceiver { rx })
}

impl RelaySender {
    /// Send without waiting for, or asking for, an acknowledgement.
    pub fn send(&self, message: RelayMessage) {
        let kind = message.kind();
        match self.deliver(Envelope { message, ack: None }) {
            Ok(()) => tracing::debug!(kind, "relay message sent"),
            Err(e) => tracing::warn!(kind, "relay delivery failed: {e}"),
        }
    }

    /// Send and hand back a receiver for the acknowledgement. The caller may
    /// drop it; the coordinator does not care whether anyone listens.
    pub fn send_with_ack(
        &self,
        message: RelayMessage,
    ) -> PausepointResult<oneshot::Receiver<RelayAck>> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.deliver(Envelope {
            message,
            ack: Some(ack_tx),
        })?;
        Ok(ack_rx)
    }

    fn deliver(&self, envelope: Envelope) -> PausepointResult<()> {
        let kind = envelope.message.kind();
        self.tx
            .send(envelope)
            .map_err(|_| PausepointError::RelayClosed(format!("{kind}: coordinator is gone")))
    }

    /// Whether the coordinator end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl RelayReceiver {
    /// Wait for the next envelope; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Take an envelope if one is already queued.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteVariant;
    use serde_json::json;

    fn detection(price: f64) -> Detection {
        Detection {
            price,
            product_name: "Wireless Mouse".to_string(),
            source_url: "https://www.amazon.com/dp/B0001".to_string(),
            origin: SiteVariant::Marketplace,
        }
    }

    #[test]
    fn test_purchase_detected_wire_shape() {
        let msg = RelayMessage::purchase(&detection(49.99));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "purchase-detected",
                "price": 49.99,
                "productName": "Wireless Mouse",
                "productUrl": "https://www.amazon.com/dp/B0001"
            })
        );
    }

    #[test]
    fn test_product_detected_parses() {
        let raw = r#"{"type":"product-detected","price":12.5,"productName":"Mug","productUrl":"https://x.test/mug"}"#;
        let msg: RelayMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind(), "product-detected");
        assert_eq!(msg.payload().product_name, "Mug");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let raw = r#"{"type":"cart-emptied","price":1,"productName":"x","productUrl":"y"}"#;
        assert!(serde_json::from_str::<RelayMessage>(raw).is_err());
    }

    #[test]
    fn test_ack_wire_shape() {
        assert_eq!(
            serde_json::to_value(RelayAck::showing_alert()).unwrap(),
            json!({"status": "showing_alert"})
        );
    }

    #[test]
    fn test_send_preserves_order() {
        let (tx, mut rx) = relay_channel();
        tx.send(RelayMessage::product(&detection(1.0)));
        tx.send(RelayMessage::purchase(&detection(2.0)));
        assert_eq!(rx.try_recv().unwrap().message.payload().price, 1.0);
        assert_eq!(rx.try_recv().unwrap().message.payload().price, 2.0);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = relay_channel();
        drop(rx);
        assert!(tx.is_closed());
        tx.send(RelayMessage::purchase(&detection(3.0)));
        assert!(matches!(
            tx.send_with_ack(RelayMessage::purchase(&detection(3.0))),
            Err(PausepointError::RelayClosed(_))
        ));
    }
}

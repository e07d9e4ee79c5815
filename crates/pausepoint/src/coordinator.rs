//! Coordinating context: receives relay messages, owns the ephemeral record,
//! and raises the decision prompt for the focused page.

use std::sync::Arc;

use crate::error::{PausepointError, PausepointResult};
use crate::relay::{RelayAck, RelayMessage, RelayReceiver};
use crate::store::{DetectionStore, EphemeralDetectionRecord};

/// Outcome of asking the host to raise the decision prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The prompt is now the active UI of the focused page.
    Shown,
    /// No page had focus; nothing was shown.
    NoActivePage,
}

/// Host mechanism that makes the decision prompt the active UI.
pub trait PromptSurface: Send + Sync {
    fn present(&self) -> PausepointResult<Presentation>;
}

/// Receiving side of the relay.
pub struct Coordinator {
    store: Arc<dyn DetectionStore>,
    surface: Arc<dyn PromptSurface>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn DetectionStore>, surface: Arc<dyn PromptSurface>) -> Self {
        Self { store, surface }
    }

    pub fn store(&self) -> &Arc<dyn DetectionStore> {
        &self.store
    }

    /// Store the payload, then try to show the prompt.
    ///
    /// Both message kinds are handled identically. Store and surface failures
    /// are logged; the sender always gets the same acknowledgement.
    pub fn handle(&self, message: &RelayMessage) -> RelayAck {
        let payload = message.payload();
        tracing::info!(
            kind = message.kind(),
            price = payload.price,
            product = %payload.product_name,
            "detection relayed"
        );

        if let Err(e) = self
            .store
            .write(EphemeralDetectionRecord::from_payload(payload))
        {
            tracing::warn!("failed to store detection: {e}");
        }

        match self.surface.present() {
            Ok(Presentation::Shown) => tracing::debug!("decision prompt shown"),
            Ok(Presentation::NoActivePage) => {
                tracing::debug!("no focused page; detection stored for the next prompt")
            }
            Err(e) => tracing::warn!("failed to present decision prompt: {e}"),
        }

        RelayAck::showing_alert()
    }

    /// Parse a raw JSON message from the host channel and handle it.
    pub fn handle_json(&self, raw: &str) -> PausepointResult<RelayAck> {
        let message: RelayMessage = serde_json::from_str(raw).map_err(PausepointError::Json)?;
        Ok(self.handle(&message))
    }

    /// Drain the relay until every sender is dropped.
    pub async fn run(&self, mut rx: RelayReceiver) {
        while let Some(envelope) = rx.recv().await {
            let ack = self.handle(&envelope.message);
            if let Some(reply) = envelope.ack {
                // The sender may have stopped listening.
                let _ = reply.send(ack);
            }
        }
        tracing::debug!("relay closed; coordinator stopping");
    }
}

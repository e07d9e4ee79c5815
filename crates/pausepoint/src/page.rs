//! Page-context agent: the reactive handlers a host wires to one page.
//!
//! The host calls exactly one handler at a time, from the page's own task:
//! [`PageAgent::on_load`] once, then [`PageAgent::on_interaction`] for every
//! capture-phase pointer event and [`PageAgent::on_mutations`] for every
//! coalesced mutation batch. The site variant is fixed at attach time.
//! Mutation batches that arrive before the initial load are ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

use crate::dom::DomSnapshot;
use crate::extract::extract;
use crate::intercept::{InteractionEvent, InterceptedAction, Interceptor};
use crate::monitor::{MonitorConfig, MutationBatch, PageMonitor};
use crate::relay::{RelayMessage, RelaySender};
use crate::site::{classify, SiteVariant};
use crate::store::DetectionStore;
use crate::types::Detection;

pub struct PageAgent {
    url: Url,
    variant: SiteVariant,
    relay: RelaySender,
    interceptor: Interceptor,
    monitor: PageMonitor,
    loaded: AtomicBool,
}

impl PageAgent {
    /// Attach to the page at `url`, classifying its site variant.
    pub fn attach(
        url: Url,
        relay: RelaySender,
        store: Arc<dyn DetectionStore>,
        config: MonitorConfig,
    ) -> Self {
        let variant = classify(&url);
        tracing::info!(url = %url, variant = %variant, "page agent attached");
        Self {
            interceptor: Interceptor::new(variant, relay.clone()),
            monitor: PageMonitor::new(variant, config, store),
            url,
            variant,
            relay,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn variant(&self) -> SiteVariant {
        self.variant
    }

    /// Initial detection. Emits `product-detected` when a price is found.
    pub fn on_load(&self, snapshot: &dyn DomSnapshot) -> Option<Detection> {
        self.loaded.store(true, Ordering::SeqCst);
        let detection =
            extract(snapshot, self.variant).into_detection(self.url.as_str(), self.variant)?;
        tracing::info!(
            price = detection.price,
            product = %detection.product_name,
            variant = %self.variant,
            "product detected at load"
        );
        self.relay.send(RelayMessage::product(&detection));
        Some(detection)
    }

    pub fn on_interaction(
        &self,
        snapshot: &dyn DomSnapshot,
        event: &mut dyn InteractionEvent,
    ) -> InterceptedAction {
        self.interceptor.on_interaction(snapshot, event)
    }

    pub fn on_mutations(&self, snapshot: &dyn DomSnapshot, batch: &MutationBatch) -> Option<Detection> {
        if !self.loaded.load(Ordering::SeqCst) {
            tracing::debug!(mutations = batch.len(), "mutations before initial load ignored");
            return None;
        }
        self.monitor.on_batch(snapshot, batch)
    }
}

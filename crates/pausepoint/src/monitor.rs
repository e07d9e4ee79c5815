//! Passive re-detection on page mutations.
//!
//! Sites often render the price after load. The monitor re-runs extraction
//! once per mutation batch and refreshes the ephemeral store when it finds a
//! price above the materiality threshold. It never suppresses anything and
//! never sends a relay message, so an asynchronous price reveal does not pop
//! the decision prompt on its own.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dom::DomSnapshot;
use crate::extract::extract;
use crate::site::SiteVariant;
use crate::store::{DetectionStore, EphemeralDetectionRecord};
use crate::types::Detection;

/// Default minimum price, exclusive, for a mutation-driven store update.
pub const DEFAULT_MATERIALITY_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Prices at or below this are treated as page chrome noise.
    pub materiality_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            materiality_threshold: DEFAULT_MATERIALITY_THRESHOLD,
        }
    }
}

/// What changed in one mutation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Node insertion or removal.
    ChildList,
    Attributes,
    CharacterData,
}

/// One change somewhere in the body subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// Host description of the changed node, for diagnostics only.
    pub target: String,
}

impl MutationRecord {
    pub fn new(kind: MutationKind, target: &str) -> Self {
        Self {
            kind,
            target: target.to_string(),
        }
    }
}

/// Mutations coalesced into one re-extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    pub fn new(records: Vec<MutationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Mutation-driven re-detection for one page.
pub struct PageMonitor {
    variant: SiteVariant,
    config: MonitorConfig,
    store: Arc<dyn DetectionStore>,
}

impl PageMonitor {
    pub fn new(variant: SiteVariant, config: MonitorConfig, store: Arc<dyn DetectionStore>) -> Self {
        Self {
            variant,
            config,
            store,
        }
    }

    /// Re-extract once for the whole batch. Returns the detection that was
    /// written to the store, if any.
    pub fn on_batch(&self, snapshot: &dyn DomSnapshot, batch: &MutationBatch) -> Option<Detection> {
        if batch.is_empty() {
            return None;
        }

        let source_url = snapshot.url().to_string();
        let detection = extract(snapshot, self.variant).into_detection(&source_url, self.variant)?;
        if detection.price <= self.config.materiality_threshold {
            tracing::debug!(
                price = detection.price,
                threshold = self.config.materiality_threshold,
                mutations = batch.len(),
                "price below materiality threshold; store untouched"
            );
            return None;
        }

        match self
            .store
            .write(EphemeralDetectionRecord::from_detection(&detection))
        {
            Ok(()) => {
                tracing::debug!(price = detection.price, mutations = batch.len(), "store refreshed");
                Some(detection)
            }
            Err(e) => {
                tracing::warn!("failed to refresh detection store: {e}");
                None
            }
        }
    }
}

/// Host side of the mutation channel.
#[derive(Debug, Clone)]
pub struct MutationNotifier {
    tx: mpsc::UnboundedSender<MutationRecord>,
}

impl MutationNotifier {
    /// Queue a mutation. Dropped silently once the coalescer is gone.
    pub fn notify(&self, record: MutationRecord) {
        let _ = self.tx.send(record);
    }
}

/// Turns a stream of individual mutations into batches.
///
/// A batch is everything that has queued up by the time the page task gets
/// around to it, so a burst of rapid mutations costs one extraction.
#[derive(Debug)]
pub struct MutationCoalescer {
    rx: mpsc::UnboundedReceiver<MutationRecord>,
}

impl MutationCoalescer {
    pub fn channel() -> (MutationNotifier, MutationCoalescer) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MutationNotifier { tx }, MutationCoalescer { rx })
    }

    /// Wait for at least one mutation, then drain everything already queued.
    /// `None` once every notifier is dropped and the queue is empty.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        let first = self.rx.recv().await?;
        let mut records = vec![first];
        while let Ok(record) = self.rx.try_recv() {
            records.push(record);
        }
        Some(MutationBatch::new(records))
    }
}

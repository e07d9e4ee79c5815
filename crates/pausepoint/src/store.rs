//! Ephemeral detection store.
//!
//! A last-write-wins register holding the most recently relayed detection. All
//! fields of a record are written as one value, so readers never observe a
//! price from one detection next to the name of another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PausepointError, PausepointResult};
use crate::relay::DetectionPayload;
use crate::types::Detection;

/// The most recent detection, as stored for the decision prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralDetectionRecord {
    pub detected_price: f64,
    pub product_name: String,
    pub product_url: String,
    pub stored_at: DateTime<Utc>,
}

impl EphemeralDetectionRecord {
    pub fn from_payload(payload: &DetectionPayload) -> Self {
        Self {
            detected_price: payload.price,
            product_name: payload.product_name.clone(),
            product_url: payload.product_url.clone(),
            stored_at: Utc::now(),
        }
    }

    pub fn from_detection(detection: &Detection) -> Self {
        Self::from_payload(&DetectionPayload::from(detection))
    }
}

/// Host key-value store addressed by the coordinating context.
pub trait DetectionStore: Send + Sync {
    /// Overwrite the register.
    fn write(&self, record: EphemeralDetectionRecord) -> PausepointResult<()>;
    /// Current record, if any.
    fn read(&self) -> PausepointResult<Option<EphemeralDetectionRecord>>;
    /// Drop the current record.
    fn clear(&self) -> PausepointResult<()>;
}

/// In-process [`DetectionStore`]. Clones share the same register.
#[derive(Debug, Clone, Default)]
pub struct MemoryDetectionStore {
    slot: Arc<RwLock<Option<EphemeralDetectionRecord>>>,
    writes: Arc<AtomicU64>,
}

impl MemoryDetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes accepted since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl DetectionStore for MemoryDetectionStore {
    fn write(&self, record: EphemeralDetectionRecord) -> PausepointResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| PausepointError::Store(format!("detection register poisoned: {e}")))?;
        *slot = Some(record);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn read(&self) -> PausepointResult<Option<EphemeralDetectionRecord>> {
        let slot = self
            .slot
            .read()
            .map_err(|e| PausepointError::Store(format!("detection register poisoned: {e}")))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> PausepointResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| PausepointError::Store(format!("detection register poisoned: {e}")))?;
        *slot = None;
        Ok(())
    }
}

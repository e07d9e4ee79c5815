//! Decision-prompt model: what the prompt shows and what each choice means.
//!
//! Rendering and the actual tab navigation stay with the host.

use crate::budget::{reconcile, BudgetSummary, SavingsProfile};
use crate::error::PausepointResult;
use crate::store::{DetectionStore, EphemeralDetectionRecord};

/// The user's answer to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Continue,
    Cancel,
}

/// What the host should do after the prompt closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Send the focused page back to the product.
    NavigateTo(String),
    /// Close the prompt and leave the page alone.
    Dismiss,
}

/// One display cycle of the decision prompt.
#[derive(Debug, Clone)]
pub struct DecisionPrompt {
    record: EphemeralDetectionRecord,
    summary: BudgetSummary,
}

impl DecisionPrompt {
    /// Read the latest record once and reconcile it against `profile`.
    ///
    /// Returns `None` when nothing has been detected yet.
    pub fn open(store: &dyn DetectionStore, profile: &SavingsProfile) -> PausepointResult<Option<Self>> {
        let Some(record) = store.read()? else {
            return Ok(None);
        };
        let summary = reconcile(&record, profile);
        Ok(Some(Self { record, summary }))
    }

    pub fn record(&self) -> &EphemeralDetectionRecord {
        &self.record
    }

    pub fn summary(&self) -> &BudgetSummary {
        &self.summary
    }

    pub fn choose(&self, choice: PromptChoice) -> PromptOutcome {
        match choice {
            PromptChoice::Continue if !self.record.product_url.is_empty() => {
                PromptOutcome::NavigateTo(self.record.product_url.clone())
            }
            PromptChoice::Continue | PromptChoice::Cancel => PromptOutcome::Dismiss,
        }
    }
}

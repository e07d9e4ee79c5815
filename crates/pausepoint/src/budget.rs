//! Budget reconciliation for the decision prompt.
//!
//! Pure display math over the stored detection and the user's savings
//! profile. Nothing here writes back to the profile.

use serde::{Deserialize, Serialize};

use crate::store::EphemeralDetectionRecord;

/// Substituted whenever the stored target is zero or otherwise unusable.
pub const DEFAULT_SAVINGS_TARGET: f64 = 1000.0;

pub const DEFAULT_CURRENT_SAVINGS: f64 = 650.0;

fn default_target() -> f64 {
    DEFAULT_SAVINGS_TARGET
}

fn default_current() -> f64 {
    DEFAULT_CURRENT_SAVINGS
}

/// User-configured savings figures, persisted by the coordinating context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsProfile {
    #[serde(rename = "savingsTarget", default = "default_target")]
    pub target: f64,
    #[serde(rename = "currentSavings", default = "default_current")]
    pub current: f64,
}

impl Default for SavingsProfile {
    fn default() -> Self {
        Self {
            target: DEFAULT_SAVINGS_TARGET,
            current: DEFAULT_CURRENT_SAVINGS,
        }
    }
}

impl SavingsProfile {
    pub fn new(target: f64, current: f64) -> Self {
        Self { target, current }
    }

    /// The target used for every computation; never zero.
    pub fn effective_target(&self) -> f64 {
        if self.target.is_finite() && self.target > 0.0 {
            self.target
        } else {
            DEFAULT_SAVINGS_TARGET
        }
    }
}

/// Figures shown next to a detected purchase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub target: f64,
    pub current: f64,
    pub price: f64,
    /// `round(current / target * 100)`.
    pub progress_percent: i64,
    /// `target - current`.
    pub remaining: f64,
    /// `round(price / target * 100)`.
    pub impact_percent: i64,
}

impl BudgetSummary {
    pub fn target_label(&self) -> String {
        format!("${}", self.target)
    }

    pub fn progress_label(&self) -> String {
        format!("{}%", self.progress_percent)
    }

    pub fn remaining_label(&self) -> String {
        format!("${:.2}", self.remaining)
    }

    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }

    pub fn impact_label(&self) -> String {
        format!("{}%", self.impact_percent)
    }

    pub fn impact_sentence(&self) -> String {
        format!(
            "This purchase is equivalent to {} of your monthly savings target.",
            self.impact_label()
        )
    }
}

/// Compute the display figures for `record` against `profile`.
pub fn reconcile(record: &EphemeralDetectionRecord, profile: &SavingsProfile) -> BudgetSummary {
    let target = profile.effective_target();
    let current = profile.current;
    let price = record.detected_price;

    BudgetSummary {
        target,
        current,
        price,
        progress_percent: whole_percent(current, target),
        remaining: target - current,
        impact_percent: whole_percent(price, target),
    }
}

fn whole_percent(part: f64, whole: f64) -> i64 {
    (part / whole * 100.0).round() as i64
}

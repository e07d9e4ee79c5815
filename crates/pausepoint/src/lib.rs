//! Pausepoint: product detection and purchase-intent relay.
//!
//! The page context runs the synchronous extraction engine, the purchase-intent
//! interceptor and the mutation monitor. Detections travel over the relay to a
//! coordinator that owns the ephemeral detection store and raises the decision
//! prompt, where budget reconciliation turns the record into display figures.

pub mod budget;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod extract;
pub mod intercept;
pub mod monitor;
pub mod page;
pub mod prompt;
pub mod relay;
pub mod rules;
pub mod site;
pub mod store;
pub mod types;

pub use budget::{
    reconcile, BudgetSummary, SavingsProfile, DEFAULT_CURRENT_SAVINGS, DEFAULT_SAVINGS_TARGET,
};
pub use coordinator::{Coordinator, Presentation, PromptSurface};
pub use dom::{DomSnapshot, ElementView, HtmlSnapshot, Locator};
pub use error::{PausepointError, PausepointResult};
pub use extract::{extract, extract_price, extract_product_name, Extraction};
pub use intercept::{
    is_purchase_intent, ClickEvent, InteractionEvent, InteractionPhase, InterceptedAction,
    Interceptor,
};
pub use monitor::{
    MonitorConfig, MutationBatch, MutationCoalescer, MutationKind, MutationNotifier,
    MutationRecord, PageMonitor,
};
pub use page::PageAgent;
pub use prompt::{DecisionPrompt, PromptChoice, PromptOutcome};
pub use relay::{
    relay_channel, AckStatus, DetectionPayload, Envelope, RelayAck, RelayMessage, RelayReceiver,
    RelaySender,
};
pub use site::{classify, is_shopping_site, SiteVariant};
pub use store::{DetectionStore, EphemeralDetectionRecord, MemoryDetectionStore};
pub use types::{Detection, FALLBACK_PRODUCT_NAME, MAX_PRICE, MAX_PRODUCT_NAME_CHARS};

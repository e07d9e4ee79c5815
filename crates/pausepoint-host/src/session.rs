//! One page context wired to an in-process coordinator.
//!
//! The page agent runs on the caller's task; the coordinator runs as a spawned
//! task draining the relay. [`HostSession::finish`] drops the page side,
//! waits for the relay to drain, and opens the decision prompt.

use std::sync::Arc;

use pausepoint::{
    is_shopping_site, relay_channel, ClickEvent, Coordinator, DecisionPrompt, Detection,
    HtmlSnapshot, InterceptedAction, Locator, MemoryDetectionStore, MonitorConfig, MutationBatch,
    MutationCoalescer, MutationKind, MutationRecord, PageAgent, SavingsProfile,
};
use tokio::task::JoinHandle;
use url::Url;

use crate::error::{HostError, HostResult};
use crate::surface::ConsoleSurface;

pub struct HostSession {
    url: Url,
    agent: PageAgent,
    store: MemoryDetectionStore,
    surface: Arc<ConsoleSurface>,
    coordinator: JoinHandle<()>,
}

impl HostSession {
    /// Attach a page agent for `url` and start the coordinator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(url: &str, config: MonitorConfig, focused: bool) -> HostResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| HostError::InvalidInput(format!("bad page URL {url}: {e}")))?;
        if !is_shopping_site(&url) {
            tracing::warn!("{} is not on the shopping allow-list", url.host_str().unwrap_or(""));
        }

        let store = MemoryDetectionStore::new();
        let surface = Arc::new(ConsoleSurface::new(focused));
        let coordinator = Coordinator::new(Arc::new(store.clone()), surface.clone());
        let (tx, rx) = relay_channel();
        let coordinator = tokio::spawn(async move { coordinator.run(rx).await });

        let agent = PageAgent::attach(url.clone(), tx, Arc::new(store.clone()), config);

        Ok(Self {
            url,
            agent,
            store,
            surface,
            coordinator,
        })
    }

    pub fn agent(&self) -> &PageAgent {
        &self.agent
    }

    pub fn store(&self) -> &MemoryDetectionStore {
        &self.store
    }

    pub fn surface(&self) -> &ConsoleSurface {
        &self.surface
    }

    fn snapshot(&self, html: &str) -> HtmlSnapshot {
        HtmlSnapshot::from_parts(html, self.url.clone())
    }

    /// Run page-load detection over `html`.
    pub fn load(&self, html: &str) -> Option<Detection> {
        self.agent.on_load(&self.snapshot(html))
    }

    /// Dispatch a capture-phase click on the first element matching `selector`.
    pub fn click(&self, html: &str, selector: &str) -> HostResult<InterceptedAction> {
        let snapshot = self.snapshot(html);
        let locator = Locator::parse(selector)?;
        let target = snapshot
            .first(&locator)
            .ok_or_else(|| HostError::NoSuchElement(selector.to_string()))?;
        let mut event = ClickEvent::capture(target);
        let action = self.agent.on_interaction(&snapshot, &mut event);
        if event.default_prevented() {
            tracing::info!("click on {selector} suppressed pending decision");
        } else {
            tracing::info!("click on {selector} proceeds");
        }
        Ok(action)
    }

    /// Feed one mutation batch, with `html` as the page after the batch.
    pub fn mutate(&self, html: &str, batch: &MutationBatch) -> Option<Detection> {
        self.agent.on_mutations(&self.snapshot(html), batch)
    }

    /// Replay saved renders of the page, each one the document after a burst
    /// of DOM changes. Every burst goes through the mutation coalescer, so the
    /// monitor sees one batch per render.
    pub async fn replay<S: AsRef<str>>(&self, renders: &[S]) -> Vec<Option<Detection>> {
        let (notifier, mut coalescer) = MutationCoalescer::channel();
        let mut detections = Vec::with_capacity(renders.len());
        for html in renders {
            notifier.notify(MutationRecord::new(MutationKind::ChildList, "body"));
            notifier.notify(MutationRecord::new(MutationKind::CharacterData, "#text"));
            let Some(batch) = coalescer.next_batch().await else {
                break;
            };
            detections.push(self.mutate(html.as_ref(), &batch));
        }
        detections
    }

    /// Close the page side, let the coordinator drain, and open the prompt.
    pub async fn finish(self, profile: &SavingsProfile) -> HostResult<Option<DecisionPrompt>> {
        let Self {
            agent,
            store,
            coordinator,
            ..
        } = self;
        drop(agent);
        if let Err(e) = coordinator.await {
            tracing::warn!("coordinator task ended abnormally: {e}");
        }
        Ok(DecisionPrompt::open(&store, profile)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.bestbuy.com/site/headphones/123.p";

    const PAGE: &str = r#"<html><head><title>Noise Cancelling Headphones | Best Buy</title></head>
        <body><h1>Noise Cancelling Headphones</h1>
        <div class="price-current">$299.99</div>
        <button class="add-to-cart-button">Add to Cart</button></body></html>"#;

    #[tokio::test]
    async fn test_click_then_prompt() {
        let session = HostSession::start(URL, MonitorConfig::default(), true).unwrap();
        let action = session.click(PAGE, "button").unwrap();
        assert!(action.suppressed());

        let prompt = session.finish(&SavingsProfile::default()).await.unwrap().unwrap();
        assert_eq!(prompt.record().detected_price, 299.99);
        assert_eq!(prompt.record().product_name, "Noise Cancelling Headphones");
        assert_eq!(prompt.summary().impact_label(), "30%");
    }

    #[tokio::test]
    async fn test_missing_element() {
        let session = HostSession::start(URL, MonitorConfig::default(), true).unwrap();
        assert!(matches!(
            session.click(PAGE, "#nope"),
            Err(HostError::NoSuchElement(_))
        ));
    }

    #[tokio::test]
    async fn test_mutation_only_session_has_record_but_no_prompt_raised() {
        let session = HostSession::start(URL, MonitorConfig::default(), true).unwrap();
        assert!(session.load("<html><body><h1>Loading</h1></body></html>").is_none());
        let batch = MutationBatch::new(vec![MutationRecord::new(MutationKind::ChildList, "body")]);
        assert!(session.mutate(PAGE, &batch).is_some());
        assert_eq!(session.surface().presented(), 0);
        let prompt = session.finish(&SavingsProfile::default()).await.unwrap();
        assert!(prompt.is_some());
    }

    #[tokio::test]
    async fn test_bad_url() {
        assert!(matches!(
            HostSession::start("not a url", MonitorConfig::default(), true),
            Err(HostError::InvalidInput(_))
        ));
    }
}

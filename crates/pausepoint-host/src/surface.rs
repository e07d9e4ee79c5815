//! Console decision-prompt surface.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pausepoint::{DecisionPrompt, PausepointResult, Presentation, PromptSurface};

/// [`PromptSurface`] for a terminal host. Presenting only marks the prompt as
/// raised; the session renders it once the relay has drained.
#[derive(Debug)]
pub struct ConsoleSurface {
    focused: AtomicBool,
    presented: AtomicUsize,
}

impl ConsoleSurface {
    pub fn new(focused: bool) -> Self {
        Self {
            focused: AtomicBool::new(focused),
            presented: AtomicUsize::new(0),
        }
    }

    /// Simulate the user switching away from, or back to, the page.
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    /// How many times the prompt was raised.
    pub fn presented(&self) -> usize {
        self.presented.load(Ordering::SeqCst)
    }
}

impl PromptSurface for ConsoleSurface {
    fn present(&self) -> PausepointResult<Presentation> {
        if !self.focused.load(Ordering::SeqCst) {
            return Ok(Presentation::NoActivePage);
        }
        self.presented.fetch_add(1, Ordering::SeqCst);
        Ok(Presentation::Shown)
    }
}

/// Render a prompt as plain text.
pub fn render_prompt(prompt: &DecisionPrompt) -> String {
    let record = prompt.record();
    let summary = prompt.summary();
    let mut out = String::new();
    let _ = writeln!(out, "Before you buy: {}", record.product_name);
    let _ = writeln!(out, "  Price:            {}", summary.price_label());
    let _ = writeln!(out, "  Savings target:   {}", summary.target_label());
    let _ = writeln!(out, "  Progress:         {}", summary.progress_label());
    let _ = writeln!(out, "  Remaining budget: {}", summary.remaining_label());
    let _ = writeln!(out, "  {}", summary.impact_sentence());
    let _ = write!(out, "  Product: {}", record.product_url);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pausepoint::{
        DetectionPayload, DetectionStore, EphemeralDetectionRecord, MemoryDetectionStore,
        SavingsProfile,
    };

    #[test]
    fn test_unfocused_surface_shows_nothing() {
        let surface = ConsoleSurface::new(false);
        assert_eq!(surface.present().unwrap(), Presentation::NoActivePage);
        surface.set_focused(true);
        assert_eq!(surface.present().unwrap(), Presentation::Shown);
        assert_eq!(surface.presented(), 1);
    }

    #[test]
    fn test_render_prompt() {
        let store = MemoryDetectionStore::new();
        store
            .write(EphemeralDetectionRecord::from_payload(&DetectionPayload {
                price: 250.0,
                product_name: "Espresso Machine".to_string(),
                product_url: "https://shop.example.com/espresso".to_string(),
            }))
            .unwrap();
        let prompt = DecisionPrompt::open(&store, &SavingsProfile::default())
            .unwrap()
            .unwrap();

        let text = render_prompt(&prompt);
        assert!(text.contains("Espresso Machine"));
        assert!(text.contains("$250.00"));
        assert!(text.contains("65%"));
        assert!(text.contains("$350.00"));
        assert!(text.contains("equivalent to 25%"));
    }
}

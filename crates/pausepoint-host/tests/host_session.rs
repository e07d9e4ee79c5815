//! Host integration tests: profile persistence, sessions and prompt rendering.

use serde_json::{json, Value};

use pausepoint::{
    MonitorConfig, MutationBatch, MutationKind, MutationRecord, PromptChoice, PromptOutcome,
    SavingsProfile,
};
use pausepoint_host::{render_prompt, HostError, HostSession, ProfileStore};

// ─────────────────────── helpers ───────────────────────

const SHOP_URL: &str = "https://www.target.com/p/stand-mixer/-/A-100";

fn product_page(price: &str) -> String {
    format!(
        r#"<html><head><title>Stand Mixer : Target</title></head>
           <body>
             <h1>Stand Mixer</h1>
             <span class="price">{price}</span>
             <button id="buy_now">Buy now</button>
             <a href="/help">Help</a>
           </body></html>"#
    )
}

fn temp_profile(dir: &tempfile::TempDir) -> ProfileStore {
    ProfileStore::new(dir.path().join("nested").join("profile.json"))
}

fn single_batch() -> MutationBatch {
    MutationBatch::new(vec![MutationRecord::new(MutationKind::ChildList, "span.price")])
}

// ─────────────────────── profile ───────────────────────

#[test]
fn profile_round_trips_with_wire_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_profile(&dir);
    store.save(&SavingsProfile::new(2400.0, 300.0)).unwrap();

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw, json!({"savingsTarget": 2400.0, "currentSavings": 300.0}));
    assert_eq!(store.load().unwrap(), SavingsProfile::new(2400.0, 300.0));
}

#[test]
fn missing_profile_is_seeded_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_profile(&dir);
    assert!(!store.path().exists());
    assert_eq!(store.load_or_seed().unwrap(), SavingsProfile::default());
    assert!(store.path().exists());
}

#[test]
fn corrupt_profile_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(ProfileStore::new(path).load(), Err(HostError::Json(_))));
}

// ─────────────────────── sessions ───────────────────────

#[tokio::test]
async fn buy_now_click_renders_prompt_against_profile() {
    let page = product_page("$120.00");
    let session = HostSession::start(SHOP_URL, MonitorConfig::default(), true).unwrap();
    assert!(session.load(&page).is_some());

    let action = session.click(&page, "#buy_now").unwrap();
    assert!(action.suppressed());

    let prompt = session
        .finish(&SavingsProfile::new(400.0, 100.0))
        .await
        .unwrap()
        .unwrap();
    let text = render_prompt(&prompt);
    assert!(text.contains("Stand Mixer"));
    assert!(text.contains("$120.00"));
    assert!(text.contains("25%"));
    assert!(text.contains("equivalent to 30%"));
    assert!(text.contains("$300.00"));
    assert_eq!(
        prompt.choose(PromptChoice::Continue),
        PromptOutcome::NavigateTo(SHOP_URL.to_string())
    );
}

#[tokio::test]
async fn non_purchase_click_is_not_held() {
    let page = product_page("$120.00");
    let session = HostSession::start(SHOP_URL, MonitorConfig::default(), true).unwrap();
    let action = session.click(&page, "a").unwrap();
    assert!(!action.suppressed());
    assert_eq!(session.surface().presented(), 0);
}

#[tokio::test]
async fn unfocused_surface_still_stores_the_record() {
    let page = product_page("$75.00");
    let session = HostSession::start(SHOP_URL, MonitorConfig::default(), false).unwrap();
    session.click(&page, "#buy_now").unwrap();
    let store = session.store().clone();
    let prompt = session.finish(&SavingsProfile::default()).await.unwrap();
    assert_eq!(store.write_count(), 1);
    assert_eq!(prompt.unwrap().record().detected_price, 75.0);
}

#[tokio::test]
async fn replay_keeps_latest_material_price() {
    let session = HostSession::start(SHOP_URL, MonitorConfig::default(), true).unwrap();
    assert!(session.load(&product_page("")).is_none());

    // Below the materiality threshold.
    assert!(session.mutate(&product_page("$20.00"), &single_batch()).is_none());
    assert_eq!(session.store().write_count(), 0);

    session.mutate(&product_page("$180.00"), &single_batch());
    session.mutate(&product_page("$160.00"), &single_batch());

    let store = session.store().clone();
    let prompt = session.finish(&SavingsProfile::default()).await.unwrap().unwrap();
    assert_eq!(prompt.record().detected_price, 160.0);
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn replay_coalesces_each_render_into_one_batch() {
    let session = HostSession::start(SHOP_URL, MonitorConfig::default(), true).unwrap();
    session.load(&product_page(""));

    let renders = [product_page("$30.00"), product_page("$95.00"), product_page("")];
    let detections = session.replay(&renders).await;
    let prices: Vec<Option<f64>> = detections.iter().map(|d| d.as_ref().map(|d| d.price)).collect();
    assert_eq!(prices, vec![None, Some(95.0), None]);
    assert_eq!(session.store().write_count(), 1);
    assert_eq!(session.surface().presented(), 0);
}

//! Clearing flow: request -> paced removal -> tab refresh -> history.
//!
//! Steps:
//! 1. Build an orchestrator over scripted removal and tab doubles and a
//!    SQLite-backed store
//! 2. Clear cache, cookies and indexedDB for `shop.example.com` in chunks of two
//! 3. Verify removal calls, their origins and their pacing
//! 4. Verify only the domain's tabs were reloaded
//! 5. Verify the clear was recorded in the persisted history
//!
//! A second scenario scripts the second chunk to reject and checks the
//! failure is reported verbatim with no tabs reloaded.

use std::sync::Arc;
use std::time::Duration;

use sweep_clear::{CategoryRegistry, ClearingOrchestrator, HistoryLedger};
use sweep_db::SqliteStore;
use sweep_integration_tests::{ScriptedRemoval, ScriptedTabs};
use sweep_types::{ClearingRequest, DataCategory};

const DOMAIN: &str = "shop.example.com";
const SINCE_MS: u64 = 1_700_000_000_000;
const BATCH_DELAY_MS: u64 = 50;
const LATENCY: Duration = Duration::from_millis(10);

type Orchestrator =
    ClearingOrchestrator<Arc<ScriptedRemoval>, Arc<ScriptedTabs>, Arc<SqliteStore>>;

fn open_tabs() -> ScriptedTabs {
    ScriptedTabs::new([
        (1, "https://shop.example.com/cart"),
        (2, "http://www.shop.example.com/"),
        (3, "https://example.com/"),
        (4, "https://blog.shop.example.com/"),
    ])
    .with_raw_tab(None, Some("https://shop.example.com/no-id"))
    .with_raw_tab(Some(5), None)
}

fn shop_request() -> ClearingRequest {
    ClearingRequest {
        domain: Some(DOMAIN.to_string()),
        since_ms: SINCE_MS,
        categories: vec![
            DataCategory::Cache,
            DataCategory::Cookies,
            DataCategory::IndexedDb,
        ],
        batch_size: 2,
        batch_delay_ms: BATCH_DELAY_MS,
        auto_refresh: true,
    }
}

fn build(
    removal: ScriptedRemoval,
    tabs: ScriptedTabs,
) -> (Orchestrator, Arc<ScriptedRemoval>, Arc<ScriptedTabs>, Arc<SqliteStore>) {
    let removal = Arc::new(removal);
    let tabs = Arc::new(tabs);
    let store = Arc::new(SqliteStore::open_memory().expect("open sqlite"));
    let orchestrator = ClearingOrchestrator::new(
        Arc::clone(&removal),
        Arc::clone(&tabs),
        Arc::clone(&store),
        Arc::new(CategoryRegistry::builtin()),
    );
    (orchestrator, removal, tabs, store)
}

#[tokio::test(start_paused = true)]
async fn shop_clear_succeeds_and_refreshes_tabs() {
    // ===== Step 1: Wire the orchestrator =====
    let (orchestrator, removal, tabs, store) =
        build(ScriptedRemoval::new().with_latency(LATENCY), open_tabs());

    // ===== Step 2: Clear =====
    let result = orchestrator.clear(&shop_request()).await;
    assert!(result.success, "clear should succeed: {:?}", result.error);
    assert_eq!(result.error, None);

    // ===== Step 3: Removal calls =====
    let calls = removal.calls();
    assert_eq!(calls.len(), 2, "three scoped categories in chunks of two");

    assert_eq!(calls[0].data_types, vec!["cache", "cookies"]);
    assert_eq!(calls[1].data_types, vec!["indexedDB"]);
    for call in &calls {
        assert_eq!(call.options.since, SINCE_MS);
        assert_eq!(
            call.options.origins.as_deref(),
            Some(
                &[
                    "https://shop.example.com".to_string(),
                    "http://shop.example.com".to_string()
                ][..]
            )
        );
    }

    assert_eq!(calls[0].issued_at, Duration::ZERO);
    assert_eq!(calls[1].issued_at, Duration::from_millis(BATCH_DELAY_MS));
    assert_eq!(removal.completed(), 2);
    // Last call issued at 50ms completes 10ms later.
    assert_eq!(result.time_used_ms, BATCH_DELAY_MS + 10);

    // ===== Step 4: Tab refresh =====
    assert_eq!(result.refreshed_tab_count, Some(2));
    assert_eq!(tabs.reloaded(), vec![1, 2]);
    assert_eq!(tabs.queries(), 1);

    // ===== Step 5: Persisted history =====
    let ledger = HistoryLedger::new(Arc::clone(&store));
    let history = ledger.history_for(DOMAIN);
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].data_types,
        vec![
            DataCategory::Cache,
            DataCategory::Cookies,
            DataCategory::IndexedDb
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn shop_clear_fails_when_second_chunk_rejects() {
    let (orchestrator, removal, tabs, store) = build(
        ScriptedRemoval::new()
            .with_latency(LATENCY)
            .failing_call(1, "quota exceeded"),
        open_tabs(),
    );

    let result = orchestrator.clear(&shop_request()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("quota exceeded"));
    assert_eq!(result.refreshed_tab_count, None);
    assert_eq!(result.time_used_ms, BATCH_DELAY_MS + 10);

    // Both chunks were issued and driven to completion.
    assert_eq!(removal.calls().len(), 2);
    assert_eq!(removal.completed(), 2);

    // No tab is touched after a failed removal.
    assert_eq!(tabs.queries(), 0);
    assert!(tabs.reloaded().is_empty());

    // Failed attempts are still recorded.
    let ledger = HistoryLedger::new(store);
    assert_eq!(ledger.history_for(DOMAIN).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_tab_reload_does_not_fail_clear() {
    let (orchestrator, _removal, tabs, _store) =
        build(ScriptedRemoval::new(), open_tabs().failing_reload(1));

    let result = orchestrator.clear(&shop_request()).await;

    assert!(result.success);
    assert_eq!(result.refreshed_tab_count, Some(1));
    assert_eq!(tabs.reloaded(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn wildcard_clear_is_unscoped_but_refreshes_matching_tabs() {
    let (orchestrator, removal, tabs, _store) = build(ScriptedRemoval::new(), open_tabs());

    let mut request = shop_request();
    request.domain = Some("*.shop.example.com".to_string());
    let result = orchestrator.clear(&request).await;

    assert!(result.success);
    assert!(removal
        .calls()
        .iter()
        .all(|call| call.options.origins.is_none()));

    // Only hosts with a subdomain in front of `.shop.example.com`.
    assert_eq!(tabs.reloaded(), vec![2, 4]);
    assert_eq!(result.refreshed_tab_count, Some(2));
}

#[tokio::test(start_paused = true)]
async fn clear_without_domain_skips_refresh() {
    let (orchestrator, removal, tabs, store) = build(ScriptedRemoval::new(), open_tabs());

    let mut request = shop_request();
    request.domain = None;
    let result = orchestrator.clear(&request).await;

    assert!(result.success);
    assert_eq!(result.refreshed_tab_count, None);
    assert_eq!(tabs.queries(), 0);
    assert!(removal.calls().iter().all(|c| c.options.origins.is_none()));

    // Recorded under the empty domain.
    let ledger = HistoryLedger::new(store);
    assert_eq!(ledger.history()[0].domain, "");
}

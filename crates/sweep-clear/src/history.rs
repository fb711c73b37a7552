//! Bounded, most-recent-first clean history.
//!
//! History is best-effort: store failures are logged and the operation
//! degrades to a no-op (writes) or an empty history (reads).

use std::sync::Mutex;

use sweep_db::{load_json, store_json, KeyValueStore};
use sweep_types::{now_ms, CleanHistoryEntry, DataCategory, HISTORY_CAPACITY};
use tracing::{debug, error, warn};

use crate::ClearError;

/// Store key of the persisted history.
pub const HISTORY_KEY: &str = "clean_history";

pub struct HistoryLedger<S> {
    store: S,
    capacity: usize,
    // Serializes read-modify-write of the persisted sequence.
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> HistoryLedger<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, HISTORY_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a clear that happened now.
    pub fn record(&self, domain: &str, categories: &[DataCategory]) {
        self.record_at(domain, categories, now_ms());
    }

    /// Prepend an entry and drop everything beyond capacity.
    pub fn record_at(&self, domain: &str, categories: &[DataCategory], timestamp_ms: u64) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    domain,
                    error = %e,
                    "history unreadable, entry not recorded until history is cleared"
                );
                return;
            }
        };
        entries.insert(
            0,
            CleanHistoryEntry {
                domain: domain.to_string(),
                data_types: categories.to_vec(),
                timestamp_ms,
            },
        );
        entries.truncate(self.capacity);

        match store_json(&self.store, HISTORY_KEY, &entries) {
            Ok(()) => debug!(domain, len = entries.len(), "history entry recorded"),
            Err(e) => {
                let e = ClearError::from(e);
                warn!(domain, error = %e, "failed to persist history");
            }
        }
    }

    /// All entries, most recent first.
    pub fn history(&self) -> Vec<CleanHistoryEntry> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "history unreadable, treating as empty");
            Vec::new()
        })
    }

    /// Entries recorded for exactly `domain`, most recent first.
    pub fn history_for(&self, domain: &str) -> Vec<CleanHistoryEntry> {
        self.history()
            .into_iter()
            .filter(|entry| entry.domain == domain)
            .collect()
    }

    /// Categories ranked by how many entries contain them.
    ///
    /// Ties keep the order in which categories are first met walking the
    /// history from most recent to oldest.
    pub fn most_used_categories(&self) -> Vec<DataCategory> {
        let mut counts: Vec<(DataCategory, usize)> = Vec::new();
        for entry in self.history() {
            for category in entry.data_types {
                match counts.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((category, 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.into_iter().map(|(category, _)| category).collect()
    }

    pub fn clear_history(&self) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            let e = ClearError::from(e);
            warn!(error = %e, "failed to clear history");
        }
    }

    fn load(&self) -> crate::Result<Vec<CleanHistoryEntry>> {
        Ok(load_json(&self.store, HISTORY_KEY)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_db::{DbError, MemoryStore, SqliteStore};

    /// A store whose backend is gone.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> sweep_db::Result<Option<String>> {
            Err(DbError::Unavailable("disk gone".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> sweep_db::Result<()> {
            Err(DbError::Unavailable("disk gone".into()))
        }

        fn remove(&self, _key: &str) -> sweep_db::Result<()> {
            Err(DbError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let ledger = HistoryLedger::new(MemoryStore::new());
        for i in 0..51u64 {
            ledger.record_at(&format!("site{i}.com"), &[DataCategory::Cache], i);
        }
        let history = ledger.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0].domain, "site50.com");
        assert_eq!(history[49].domain, "site1.com");
        assert!(history.iter().all(|e| e.domain != "site0.com"));
    }

    #[test]
    fn test_history_for_domain() {
        let ledger = HistoryLedger::new(SqliteStore::open_memory().expect("open"));
        ledger.record_at("a.com", &[DataCategory::Cache], 1);
        ledger.record_at("b.com", &[DataCategory::Cookies], 2);
        ledger.record_at("a.com", &[DataCategory::IndexedDb], 3);

        let for_a = ledger.history_for("a.com");
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].timestamp_ms, 3);
        assert_eq!(for_a[1].timestamp_ms, 1);
    }

    #[test]
    fn test_most_used_ranking_and_ties() {
        let ledger = HistoryLedger::new(MemoryStore::new());
        ledger.record_at("a.com", &[DataCategory::Cookies, DataCategory::Cache], 1);
        ledger.record_at("b.com", &[DataCategory::Cache], 2);
        ledger.record_at("c.com", &[DataCategory::IndexedDb, DataCategory::LocalStorage], 3);

        // Cache appears twice; the rest once, ordered by first encounter
        // from the most recent entry.
        assert_eq!(
            ledger.most_used_categories(),
            vec![
                DataCategory::Cache,
                DataCategory::IndexedDb,
                DataCategory::LocalStorage,
                DataCategory::Cookies,
            ]
        );
    }

    #[test]
    fn test_clear_history() {
        let ledger = HistoryLedger::new(MemoryStore::new());
        ledger.record_at("a.com", &[DataCategory::Cache], 1);
        ledger.clear_history();
        assert!(ledger.history().is_empty());
        assert!(ledger.most_used_categories().is_empty());
    }

    #[test]
    fn test_broken_store_is_a_no_op() {
        let ledger = HistoryLedger::new(BrokenStore);
        ledger.record("a.com", &[DataCategory::Cache]);
        ledger.clear_history();
        assert!(ledger.history().is_empty());
        assert!(ledger.history_for("a.com").is_empty());
    }

    #[test]
    fn test_corrupt_value_reads_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "not json").expect("set");
        let ledger = HistoryLedger::new(store);
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_corrupt_value_blocks_records_until_cleared() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "not json").expect("set");
        let ledger = HistoryLedger::new(std::sync::Arc::clone(&store));

        ledger.record_at("a.com", &[DataCategory::Cache], 1);
        assert_eq!(
            store.get(HISTORY_KEY).expect("get").as_deref(),
            Some("not json")
        );

        ledger.clear_history();
        ledger.record_at("a.com", &[DataCategory::Cache], 2);
        let history = ledger.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].timestamp_ms, 2);
    }
}

//! Integration test crate for Sweep.
//!
//! Holds scripted doubles of the browser's removal and tab APIs. The
//! scenarios under `tests/` drive the clearing core through them, usually
//! on paused tokio time so pacing is exact.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p sweep-integration-tests
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sweep_clear::{ApiError, DataTypeFlags, RemovalApi, RemovalOptions, TabApi, TabInfo};
use tokio::time::Instant;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One removal call as seen at issuance.
#[derive(Debug, Clone)]
pub struct RemovalCall {
    /// Time since the double was created.
    pub issued_at: Duration,
    pub options: RemovalOptions,
    /// Removal keys, sorted.
    pub data_types: Vec<String>,
}

/// Removal API double. Records each call when it is issued and completes it
/// after a fixed latency; one call can be scripted to reject.
pub struct ScriptedRemoval {
    start: Instant,
    latency: Duration,
    failing: Option<(usize, String)>,
    calls: Mutex<Vec<RemovalCall>>,
    completed: Arc<AtomicUsize>,
}

impl Default for ScriptedRemoval {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRemoval {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            latency: Duration::ZERO,
            failing: None,
            calls: Mutex::new(Vec::new()),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the `index`-th issued call (0-based) reject with `message`.
    pub fn failing_call(mut self, index: usize, message: &str) -> Self {
        self.failing = Some((index, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RemovalCall> {
        lock(&self.calls).clone()
    }

    /// Calls that have run to completion, successful or not.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl RemovalApi for ScriptedRemoval {
    fn remove(
        &self,
        options: RemovalOptions,
        data_types: DataTypeFlags,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let index = {
            let mut calls = lock(&self.calls);
            calls.push(RemovalCall {
                issued_at: self.start.elapsed(),
                options,
                data_types: data_types.into_keys().collect(),
            });
            calls.len() - 1
        };
        let failure = match &self.failing {
            Some((at, message)) if *at == index => Some(message.clone()),
            _ => None,
        };
        let latency = self.latency;
        let completed = Arc::clone(&self.completed);
        async move {
            tokio::time::sleep(latency).await;
            completed.fetch_add(1, Ordering::SeqCst);
            match failure {
                Some(message) => Err(ApiError::new(message)),
                None => Ok(()),
            }
        }
    }
}

/// Tab API double over a fixed set of open tabs.
#[derive(Default)]
pub struct ScriptedTabs {
    tabs: Vec<TabInfo>,
    failing: Vec<i64>,
    reloaded: Mutex<Vec<i64>>,
    queries: AtomicUsize,
}

impl ScriptedTabs {
    pub fn new<'a, I>(tabs: I) -> Self
    where
        I: IntoIterator<Item = (i64, &'a str)>,
    {
        Self {
            tabs: tabs
                .into_iter()
                .map(|(id, url)| TabInfo {
                    id: Some(id),
                    url: Some(url.to_string()),
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Add a tab as the browser may report it, with fields missing.
    pub fn with_raw_tab(mut self, id: Option<i64>, url: Option<&str>) -> Self {
        self.tabs.push(TabInfo {
            id,
            url: url.map(str::to_string),
        });
        self
    }

    pub fn failing_reload(mut self, tab_id: i64) -> Self {
        self.failing.push(tab_id);
        self
    }

    /// Ids reloaded successfully, in order.
    pub fn reloaded(&self) -> Vec<i64> {
        lock(&self.reloaded).clone()
    }

    /// How many times the open tabs were enumerated.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl TabApi for ScriptedTabs {
    fn query_all(&self) -> impl Future<Output = Result<Vec<TabInfo>, ApiError>> + Send {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let tabs = self.tabs.clone();
        async move { Ok(tabs) }
    }

    fn reload(&self, tab_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = if self.failing.contains(&tab_id) {
            Err(ApiError::new(format!("tab {tab_id} is gone")))
        } else {
            lock(&self.reloaded).push(tab_id);
            Ok(())
        };
        async move { result }
    }
}

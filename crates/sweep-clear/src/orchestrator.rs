//! One `clear` call: dispatch, refresh, record.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sweep_db::KeyValueStore;
use sweep_types::{
    dedup_categories, CleaningRule, ClearingDefaults, ClearingRequest, ClearingResult,
};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::api::{RemovalApi, TabApi};
use crate::dispatch::BatchDispatcher;
use crate::history::HistoryLedger;
use crate::refresh::TabRefreshMatcher;
use crate::registry::CategoryRegistry;
use crate::rules::due_rules;
use crate::ClearError;

/// Outcome of clearing one domain segment of an automatic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRun {
    pub rule_id: String,
    pub domain: String,
    pub result: ClearingResult,
}

/// Ids of the rules whose every segment cleared successfully, in run order.
pub fn fully_succeeded(runs: &[RuleRun]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for run in runs {
        if !ids.contains(&run.rule_id) {
            ids.push(run.rule_id.clone());
        }
    }
    ids.retain(|id| {
        runs.iter()
            .filter(|run| &run.rule_id == id)
            .all(|run| run.result.success)
    });
    ids
}

pub struct ClearingOrchestrator<R, T, S> {
    dispatcher: BatchDispatcher<R>,
    refresher: TabRefreshMatcher<T>,
    ledger: HistoryLedger<S>,
}

impl<R, T, S> ClearingOrchestrator<R, T, S>
where
    R: RemovalApi,
    T: TabApi,
    S: KeyValueStore,
{
    pub fn new(removal: R, tabs: T, store: S, registry: Arc<CategoryRegistry>) -> Self {
        Self {
            dispatcher: BatchDispatcher::new(removal, registry),
            refresher: TabRefreshMatcher::new(tabs),
            ledger: HistoryLedger::new(store),
        }
    }

    pub fn ledger(&self) -> &HistoryLedger<S> {
        &self.ledger
    }

    pub fn registry(&self) -> &CategoryRegistry {
        self.dispatcher.registry()
    }

    /// Clear the requested categories. Always yields exactly one result.
    ///
    /// Tabs are refreshed only after a successful removal, when the request
    /// asks for it and names a domain. Every attempted clear is recorded in
    /// the history, failed ones included.
    pub async fn clear(&self, request: &ClearingRequest) -> ClearingResult {
        if request.batch_size == 0 {
            let err = ClearError::InvalidRequest("batch size must be greater than zero".into());
            warn!(error = %err, "rejecting clearing request");
            return ClearingResult::failed(0, err.user_message());
        }

        let categories = dedup_categories(request.categories.iter().copied());
        let domain = request.target_domain();

        let started = Instant::now();
        let dispatched = self
            .dispatcher
            .dispatch(
                &categories,
                domain,
                request.since_ms,
                request.batch_size,
                Duration::from_millis(request.batch_delay_ms),
            )
            .await;
        let time_used_ms = started.elapsed().as_millis() as u64;

        let result = match dispatched {
            Ok(()) => {
                let refreshed = match domain {
                    Some(domain) if request.auto_refresh => {
                        Some(self.refresher.refresh_matching_tabs(domain).await)
                    }
                    _ => None,
                };
                info!(
                    domain = domain.unwrap_or(""),
                    categories = categories.len(),
                    time_used_ms,
                    ?refreshed,
                    "clear succeeded"
                );
                ClearingResult::succeeded(time_used_ms, refreshed)
            }
            Err(e) => {
                warn!(domain = domain.unwrap_or(""), error = %e, time_used_ms, "clear failed");
                ClearingResult::failed(time_used_ms, e.user_message())
            }
        };

        self.ledger
            .record(request.domain.as_deref().unwrap_or(""), &categories);
        result
    }

    /// Clear every domain segment of every rule due at `now_ms`, one after
    /// the other, with the rule's categories and the default pacing.
    pub async fn run_due_rules(
        &self,
        rules: &[CleaningRule],
        defaults: &ClearingDefaults,
        now_ms: u64,
    ) -> Vec<RuleRun> {
        let mut runs = Vec::new();
        for rule in due_rules(rules, now_ms) {
            let segments: Vec<String> = rule.domain_segments().map(str::to_string).collect();
            for segment in segments {
                let request = ClearingRequest::from_defaults(
                    Some(segment.clone()),
                    rule.data_types.iter().copied(),
                    defaults,
                    now_ms,
                );
                let result = self.clear(&request).await;
                if !result.success {
                    warn!(
                        rule = %rule.id,
                        domain = %segment,
                        error = result.error.as_deref().unwrap_or(""),
                        "automatic rule failed"
                    );
                }
                runs.push(RuleRun {
                    rule_id: rule.id.clone(),
                    domain: segment,
                    result,
                });
            }
        }
        if !runs.is_empty() {
            info!(runs = runs.len(), "ran due cleaning rules");
        }
        runs
    }
}

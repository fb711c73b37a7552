//! Cleaning rule commands.

use std::sync::Arc;

use serde_json::Value;
use sweep_clear::{fully_succeeded, rule_matches_host, RuleRun};
use sweep_types::{now_ms, CleaningRule};
use tracing::warn;

use super::{to_json, Result};
use crate::rpc::RpcError;
use crate::HostState;

/// Stored rules, optionally only those matching `host`.
pub async fn get_rules(state: &Arc<HostState>, params: &Value) -> Result {
    let mut rules = state.rules.load();
    if let Some(host) = params.get("host").and_then(|v| v.as_str()) {
        rules.retain(|rule| rule_matches_host(rule, host));
    }
    to_json(&rules)
}

/// Replace the stored rules.
pub async fn save_rules(state: &Arc<HostState>, params: &Value) -> Result {
    let raw = params
        .get("rules")
        .cloned()
        .ok_or_else(|| RpcError::invalid_params("rules required"))?;
    let rules: Vec<CleaningRule> =
        serde_json::from_value(raw).map_err(|e| RpcError::invalid_params(&e.to_string()))?;

    let _guard = state.rules_lock.lock().await;
    state
        .rules
        .save(&rules)
        .map_err(|e| RpcError::store_unavailable(&e.to_string()))?;
    Ok(serde_json::json!({"saved": rules.len()}))
}

pub async fn run_due_rules(state: &Arc<HostState>) -> Result {
    to_json(&run_due(state).await)
}

/// Run every due automatic rule and stamp the ones that fully succeeded.
pub async fn run_due(state: &HostState) -> Vec<RuleRun> {
    let _guard = state.rules_lock.lock().await;
    let now = now_ms();
    let rules = state.rules.load();
    let runs = state
        .orchestrator
        .run_due_rules(&rules, &state.defaults, now)
        .await;

    let cleaned = fully_succeeded(&runs);
    if let Err(e) = state.rules.mark_cleaned(&cleaned, now) {
        warn!(error = %e, rules = cleaned.len(), "failed to stamp cleaned rules");
    }
    runs
}

//! Clean history commands.

use std::sync::Arc;

use serde_json::Value;

use super::{str_param, to_json, Result};
use crate::HostState;

/// All entries, most recent first.
pub async fn get_history(state: &Arc<HostState>) -> Result {
    to_json(&state.orchestrator.ledger().history())
}

pub async fn get_history_for(state: &Arc<HostState>, params: &Value) -> Result {
    let domain = str_param(params, "domain")?;
    to_json(&state.orchestrator.ledger().history_for(domain))
}

pub async fn get_most_used_categories(state: &Arc<HostState>) -> Result {
    to_json(&state.orchestrator.ledger().most_used_categories())
}

pub async fn clear_history(state: &Arc<HostState>) -> Result {
    state.orchestrator.ledger().clear_history();
    Ok(serde_json::json!({"cleared": true}))
}

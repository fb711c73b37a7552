//! Recommendations, classification and capability lookups.

use std::sync::Arc;

use serde_json::Value;
use sweep_domain::root_domain as normalize_root;
use sweep_types::DataCategory;

use super::{str_param, to_json, Result};
use crate::rpc::RpcError;
use crate::HostState;

/// Recommended categories and advice for a domain.
pub async fn recommend(state: &Arc<HostState>, params: &Value) -> Result {
    let domain = str_param(params, "domain")?;
    to_json(&state.recommender.recommend(domain))
}

/// Site category of a domain.
pub async fn classify(state: &Arc<HostState>, params: &Value) -> Result {
    let domain = str_param(params, "domain")?;
    let classifier = state.recommender.classifier();
    Ok(serde_json::json!({
        "domain": domain,
        "rootDomain": normalize_root(domain),
        "siteCategory": classifier.classify(domain),
        "complexWebApp": classifier.is_complex_web_app(domain),
    }))
}

pub async fn root_domain(_state: &Arc<HostState>, params: &Value) -> Result {
    let domain = str_param(params, "domain")?;
    Ok(serde_json::json!({
        "domain": domain,
        "rootDomain": normalize_root(domain),
    }))
}

/// Scoping capabilities of every category.
pub async fn get_capabilities(state: &Arc<HostState>) -> Result {
    let registry = state.orchestrator.registry();
    let mut out = Vec::with_capacity(DataCategory::ALL.len());
    for category in DataCategory::ALL {
        let capability = registry
            .capability_of(category)
            .map_err(|e| RpcError::internal_error(&e.to_string()))?;
        out.push(serde_json::json!({
            "category": category,
            "label": category.label(),
            "originScoped": capability.origin_scoped,
            "requiresCustomHandling": capability.requires_custom_handling,
            "removalKey": capability.removal_key,
        }));
    }
    Ok(Value::Array(out))
}

//! The `clear` command.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use sweep_types::{now_ms, ClearingRequest, DataCategory};

use super::{to_json, Result};
use crate::rpc::RpcError;
use crate::HostState;

/// `clear` params. Omitted fields come from the `[clearing]` config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearParams {
    #[serde(default)]
    domain: Option<String>,
    categories: Vec<DataCategory>,
    #[serde(default)]
    since_ms: Option<u64>,
    #[serde(default)]
    batch_size: Option<usize>,
    #[serde(default)]
    batch_delay_ms: Option<u64>,
    #[serde(default)]
    auto_refresh: Option<bool>,
}

impl ClearParams {
    fn into_request(self, state: &HostState, now_ms: u64) -> ClearingRequest {
        let mut request =
            ClearingRequest::from_defaults(self.domain, self.categories, &state.defaults, now_ms);
        if let Some(since_ms) = self.since_ms {
            request.since_ms = since_ms;
        }
        if let Some(batch_size) = self.batch_size {
            request.batch_size = batch_size;
        }
        if let Some(batch_delay_ms) = self.batch_delay_ms {
            request.batch_delay_ms = batch_delay_ms;
        }
        if let Some(auto_refresh) = self.auto_refresh {
            request.auto_refresh = auto_refresh;
        }
        request
    }
}

/// Clear site data. A failed clear is still a successful RPC; the result
/// carries `success: false` and the error message.
pub async fn clear(state: &Arc<HostState>, params: &Value) -> Result {
    let params: ClearParams = serde_json::from_value(params.clone())
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;
    let request = params.into_request(state, now_ms());
    let result = state.orchestrator.clear(&request).await;
    to_json(&result)
}

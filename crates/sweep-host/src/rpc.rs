//! JSON-RPC 2.0 messages and request dispatch.
//!
//! The same message types travel both ways over the native-messaging
//! channel: the extension calls the host's commands, and the host calls
//! back into the extension's browser APIs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands;
use crate::HostState;

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID. Null for notifications.
    #[serde(default)]
    pub id: serde_json::Value,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response: exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: serde_json::Value::from(id),
            method: method.to_string(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            // `null` results still count as success on the wire.
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self {
            code: -32600,
            message: "INVALID_REQUEST".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Store unavailable (-32010).
    pub fn store_unavailable(detail: &str) -> Self {
        Self {
            code: -32010,
            message: "STORE_UNAVAILABLE".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }
}

/// Dispatch a request from the extension to its command handler.
pub async fn dispatch_request(state: &Arc<HostState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    if request.jsonrpc != "2.0" {
        return RpcResponse::error(id, RpcError::invalid_request());
    }

    let method = request.method.as_str();
    debug!(method, "dispatching RPC method");

    let params = &request.params;
    let result = match method {
        // Recommendations and classification
        "recommend" => commands::insights::recommend(state, params).await,
        "classify" => commands::insights::classify(state, params).await,
        "root_domain" => commands::insights::root_domain(state, params).await,
        "get_capabilities" => commands::insights::get_capabilities(state).await,

        // Clearing
        "clear" => commands::clearing::clear(state, params).await,

        // History
        "get_history" => commands::history::get_history(state).await,
        "get_history_for" => commands::history::get_history_for(state, params).await,
        "get_most_used_categories" => commands::history::get_most_used_categories(state).await,
        "clear_history" => commands::history::clear_history(state).await,

        // Cleaning rules
        "get_rules" => commands::rules::get_rules(state, params).await,
        "save_rules" => commands::rules::save_rules(state, params).await,
        "run_due_rules" => commands::rules::run_due_rules(state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}

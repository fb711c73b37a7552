//! RPC command handlers.
//!
//! Each submodule implements the commands for one area.

pub mod clearing;
pub mod history;
pub mod insights;
pub mod rules;

use serde::Serialize;
use serde_json::Value;

use crate::rpc::RpcError;

type Result = std::result::Result<Value, RpcError>;

/// The required string parameter `name`.
fn str_param<'a>(params: &'a Value, name: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{name} required")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result {
    serde_json::to_value(value)
        .map_err(|e| RpcError::internal_error(&format!("encode error: {e}")))
}

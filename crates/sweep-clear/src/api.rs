//! Contracts of the external collaborators.
//!
//! The browser owns the actual data and tabs. These traits describe the two
//! surfaces the clearing core calls into; the host implements them over its
//! messaging bridge and tests implement them with scripted doubles.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Scope of one removal call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalOptions {
    /// Only data newer than this instant (epoch ms) is removed.
    pub since: u64,
    /// Restrict removal to these origins. `None` removes for every origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
}

/// Removal key -> enabled. Ordered for stable wire output.
pub type DataTypeFlags = BTreeMap<String, bool>;

/// One open tab as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The browser's site-data removal API. Has no notion of wildcard domains.
pub trait RemovalApi: Send + Sync {
    fn remove(
        &self,
        options: RemovalOptions,
        data_types: DataTypeFlags,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// The browser's tab API.
pub trait TabApi: Send + Sync {
    fn query_all(&self) -> impl Future<Output = Result<Vec<TabInfo>, ApiError>> + Send;

    fn reload(&self, tab_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl<R: RemovalApi> RemovalApi for Arc<R> {
    fn remove(
        &self,
        options: RemovalOptions,
        data_types: DataTypeFlags,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).remove(options, data_types)
    }
}

impl<T: TabApi> TabApi for Arc<T> {
    fn query_all(&self) -> impl Future<Output = Result<Vec<TabInfo>, ApiError>> + Send {
        (**self).query_all()
    }

    fn reload(&self, tab_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).reload(tab_id)
    }
}

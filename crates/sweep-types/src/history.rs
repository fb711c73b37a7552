//! Clean history entries.

use serde::{Deserialize, Serialize};

use crate::DataCategory;

/// One past clear, as recorded by the history ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanHistoryEntry {
    /// Domain as given to the clear; empty for an unscoped clear.
    pub domain: String,
    pub data_types: Vec<DataCategory>,
    pub timestamp_ms: u64,
}

//! Clearing requests, pacing defaults and results.

use serde::{Deserialize, Serialize};

use crate::{
    dedup_categories, DataCategory, DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE,
    DEFAULT_SINCE_WINDOW_MS,
};

/// Pacing and scope defaults applied to requests that omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingDefaults {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// How far back removal reaches, relative to the time of the request.
    pub since_window_ms: u64,
    pub auto_refresh: bool,
}

impl Default for ClearingDefaults {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            since_window_ms: DEFAULT_SINCE_WINDOW_MS,
            auto_refresh: true,
        }
    }
}

/// One request to clear site data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearingRequest {
    /// Target domain. `None`, empty or wildcard means no origin restriction
    /// on removal calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Only data newer than this instant (epoch ms) is removed.
    pub since_ms: u64,
    /// Ordered set of categories; iteration order drives dispatch order.
    pub categories: Vec<DataCategory>,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub auto_refresh: bool,
}

impl ClearingRequest {
    /// Build a request from `defaults`, reaching back `since_window_ms` from `now_ms`.
    pub fn from_defaults<I>(
        domain: Option<String>,
        categories: I,
        defaults: &ClearingDefaults,
        now_ms: u64,
    ) -> Self
    where
        I: IntoIterator<Item = DataCategory>,
    {
        Self {
            domain,
            since_ms: now_ms.saturating_sub(defaults.since_window_ms),
            categories: dedup_categories(categories),
            batch_size: defaults.batch_size,
            batch_delay_ms: defaults.batch_delay_ms,
            auto_refresh: defaults.auto_refresh,
        }
    }

    /// The domain, if present and non-empty.
    pub fn target_domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}

/// Outcome of one orchestration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearingResult {
    pub success: bool,
    pub time_used_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refreshed_tab_count: Option<u32>,
}

impl ClearingResult {
    pub fn succeeded(time_used_ms: u64, refreshed_tab_count: Option<u32>) -> Self {
        Self {
            success: true,
            time_used_ms,
            error: None,
            refreshed_tab_count,
        }
    }

    pub fn failed(time_used_ms: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            time_used_ms,
            error: Some(error.into()),
            refreshed_tab_count: None,
        }
    }
}

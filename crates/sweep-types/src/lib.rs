//! # sweep-types
//!
//! Shared domain types used across the Sweep workspace: the closed set of
//! browser data categories, site categories, clearing requests and results,
//! cleaning rules and history entries.

pub mod category;
pub mod history;
pub mod request;
pub mod rule;
pub mod site;

pub use category::{CategoryCapability, DataCategory, UnknownCategory};
pub use history::CleanHistoryEntry;
pub use request::{ClearingDefaults, ClearingRequest, ClearingResult};
pub use rule::{CleaningRule, Frequency};
pub use site::SiteCategory;

/// Maximum number of entries retained in the clean history.
pub const HISTORY_CAPACITY: usize = 50;

/// Default removal window: only data from the last hour is cleared.
pub const DEFAULT_SINCE_WINDOW_MS: u64 = 60 * 60 * 1000;

/// Default number of categories per removal call.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Default pause between two removal calls of the same partition.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;

/// One day in milliseconds.
pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Remove duplicates from `categories`, keeping the first occurrence of each.
pub fn dedup_categories<I>(categories: I) -> Vec<DataCategory>
where
    I: IntoIterator<Item = DataCategory>,
{
    let mut out: Vec<DataCategory> = Vec::new();
    for category in categories {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

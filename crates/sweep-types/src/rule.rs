//! Persisted cleaning rules.
//!
//! Rules are owned by the settings layer. The clearing core only reads them
//! to decide which automatic rules are due.

use serde::{Deserialize, Serialize};

use crate::{DataCategory, DAY_MS};

/// How often an automatic rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Minimum time between two runs.
    pub fn interval_ms(self) -> u64 {
        match self {
            Frequency::Daily => DAY_MS,
            Frequency::Weekly => 7 * DAY_MS,
            Frequency::Monthly => 30 * DAY_MS,
        }
    }
}

/// A user-defined rule that clears some categories for matching domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningRule {
    pub id: String,
    pub name: String,
    /// Comma-separated domains; each segment may contain `*` wildcards.
    pub domain_pattern: String,
    pub data_types: Vec<DataCategory>,
    pub enabled: bool,
    #[serde(default)]
    pub automatic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clean_time_ms: Option<u64>,
}

impl CleaningRule {
    /// Trimmed, non-empty segments of `domain_pattern`.
    pub fn domain_segments(&self) -> impl Iterator<Item = &str> {
        self.domain_pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether this automatic rule should run at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        if !self.enabled || !self.automatic {
            return false;
        }
        let Some(frequency) = self.frequency else {
            return false;
        };
        match self.last_clean_time_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= frequency.interval_ms(),
        }
    }
}

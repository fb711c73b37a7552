//! Reading cleaning rules and selecting the due ones.

use sweep_db::{load_json, store_json, KeyValueStore};
use sweep_domain::DomainPattern;
use sweep_types::CleaningRule;
use tracing::{debug, warn};

use crate::Result;

/// Store key of the persisted rules.
pub const RULES_KEY: &str = "cleaning_rules";

/// Persisted rule list.
pub struct RuleBook<S> {
    store: S,
}

impl<S: KeyValueStore> RuleBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All rules. A missing or unreadable value yields no rules.
    pub fn load(&self) -> Vec<CleaningRule> {
        match load_json(&self.store, RULES_KEY) {
            Ok(rules) => rules.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "cleaning rules unreadable, treating as none");
                Vec::new()
            }
        }
    }

    /// Replace the stored rules.
    pub fn save(&self, rules: &[CleaningRule]) -> Result<()> {
        store_json(&self.store, RULES_KEY, rules)?;
        debug!(count = rules.len(), "cleaning rules saved");
        Ok(())
    }

    /// Stamp `last_clean_time_ms` on the rules with the given ids.
    pub fn mark_cleaned(&self, ids: &[String], now_ms: u64) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut rules = self.load();
        for rule in rules.iter_mut().filter(|r| ids.contains(&r.id)) {
            rule.last_clean_time_ms = Some(now_ms);
        }
        self.save(&rules)
    }
}

/// Rules that should run at `now_ms`, in stored order.
pub fn due_rules(rules: &[CleaningRule], now_ms: u64) -> Vec<&CleaningRule> {
    rules.iter().filter(|rule| rule.is_due(now_ms)).collect()
}

/// Whether any segment of the rule's domain pattern matches `host`.
pub fn rule_matches_host(rule: &CleaningRule, host: &str) -> bool {
    rule.domain_segments()
        .any(|segment| DomainPattern::new(segment).matches_host(host))
}

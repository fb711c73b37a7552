//! Reloading the open tabs that belong to a cleared domain.

use sweep_domain::DomainPattern;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{TabApi, TabInfo};
use crate::ClearError;

pub struct TabRefreshMatcher<T> {
    tabs: T,
}

impl<T: TabApi> TabRefreshMatcher<T> {
    pub fn new(tabs: T) -> Self {
        Self { tabs }
    }

    /// Reload every open tab whose hostname matches `domain`.
    ///
    /// `domain` may be a wildcard pattern. Tabs are reloaded one at a time.
    /// Never fails: a tab that cannot be reloaded is logged and left out of
    /// the returned count.
    pub async fn refresh_matching_tabs(&self, domain: &str) -> u32 {
        let tabs = match self.tabs.query_all().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(domain, error = %e, "failed to enumerate tabs");
                return 0;
            }
        };

        let pattern = DomainPattern::new(domain);
        let matching: Vec<(i64, String)> = tabs
            .iter()
            .filter_map(tab_host)
            .filter(|(_, host)| pattern.matches_host(host))
            .collect();

        let mut refreshed = 0u32;
        for (tab_id, host) in matching {
            match self.tabs.reload(tab_id).await {
                Ok(()) => {
                    debug!(tab_id, host = %host, "tab reloaded");
                    refreshed += 1;
                }
                Err(e) => {
                    let skipped = ClearError::TabRefreshSkipped {
                        tab_id,
                        reason: e.message,
                    };
                    warn!(error = %skipped, "tab reload failed");
                }
            }
        }

        info!(domain, refreshed, "tab refresh finished");
        refreshed
    }
}

/// `(id, hostname)` of a tab that has both an id and a parseable URL with a host.
fn tab_host(tab: &TabInfo) -> Option<(i64, String)> {
    let id = tab.id?;
    let url = tab.url.as_deref()?;
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(|host| (id, host.to_string())),
        Err(e) => {
            debug!(tab_id = id, url, error = %e, "skipping tab with unparseable url");
            None
        }
    }
}

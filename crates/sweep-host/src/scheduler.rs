//! Periodic execution of automatic cleaning rules.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::commands;
use crate::HostState;

/// Start the rules timer, unless rules are disabled in the config.
pub fn spawn(state: Arc<HostState>) -> Option<JoinHandle<()>> {
    if !state.config.rules.enabled {
        info!("automatic cleaning rules disabled");
        return None;
    }
    let period = Duration::from_secs(state.config.rules.check_interval_secs.max(1));
    Some(tokio::spawn(run(state, period)))
}

/// Check for due rules every `period`. The first check happens one full
/// period after start.
pub async fn run(state: Arc<HostState>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "rules timer started");

    loop {
        ticker.tick().await;
        let runs = commands::rules::run_due(&state).await;
        let failed = runs.iter().filter(|run| !run.result.success).count();
        debug!(runs = runs.len(), failed, "rules check finished");
    }
}

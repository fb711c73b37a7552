//! sweep-host: the browser's native-messaging host for Sweep.
//!
//! The extension launches this process and talks to it over stdin/stdout
//! with length-prefixed JSON-RPC. The host owns clearing orchestration,
//! recommendations, history and rules; the extension only relays calls
//! into the browser's data-removal and tab APIs.

mod bridge;
mod commands;
mod config;
mod rpc;
mod scheduler;
mod wire;

use std::sync::Arc;

use sweep_clear::{CategoryRegistry, ClearingOrchestrator, RuleBook};
use sweep_db::{KeyValueStore, SqliteStore};
use sweep_domain::RecommendationEngine;
use sweep_types::ClearingDefaults;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::bridge::Bridge;
use crate::config::HostConfig;
use crate::rpc::RpcRequest;

/// Persisted store shared by history and rules.
pub type Store = Arc<dyn KeyValueStore>;

pub type Orchestrator = ClearingOrchestrator<Bridge, Bridge, Store>;

/// Host-wide shared state.
pub struct HostState {
    pub config: HostConfig,
    /// Projection of `config.clearing` applied to incomplete requests.
    pub defaults: ClearingDefaults,
    pub orchestrator: Orchestrator,
    pub recommender: RecommendationEngine,
    pub rules: RuleBook<Store>,
    /// Held while rules run or are replaced, so a due rule runs once.
    pub rules_lock: tokio::sync::Mutex<()>,
}

impl HostState {
    pub fn new(config: HostConfig, bridge: Bridge, store: Store) -> Self {
        let registry = Arc::new(CategoryRegistry::builtin());
        Self {
            defaults: config.clearing.defaults(),
            orchestrator: ClearingOrchestrator::new(
                bridge.clone(),
                bridge,
                Arc::clone(&store),
                registry,
            ),
            recommender: RecommendationEngine::default(),
            rules: RuleBook::new(store),
            rules_lock: tokio::sync::Mutex::new(()),
            config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HostConfig::load()?;

    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("sweep={}", config.logging.log_level)))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "sweep host starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("sweep.db");
    let store: Store = Arc::new(SqliteStore::open(&db_path)?);
    info!(path = %db_path.display(), "store opened");

    let bridge = Bridge::new(tokio::io::stdout(), &config.bridge);
    let state = Arc::new(HostState::new(config, bridge.clone(), store));

    let rules_task = scheduler::spawn(Arc::clone(&state));

    let handler = {
        let state = Arc::clone(&state);
        move |request: RpcRequest| {
            let state = Arc::clone(&state);
            async move { rpc::dispatch_request(&state, request).await }
        }
    };

    tokio::select! {
        result = bridge.serve(tokio::io::stdin(), handler) => {
            match result {
                Ok(()) => info!("extension closed the channel"),
                Err(e) => error!(error = %e, "native messaging input failed"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    if let Some(task) = rules_task {
        task.abort();
    }
    info!("sweep host stopped");
    Ok(())
}

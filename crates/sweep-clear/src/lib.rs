//! # sweep-clear
//!
//! The clearing core: turns a set of data categories into a paced sequence
//! of calls to the browser's removal API, reloads the open tabs of the
//! cleared domain, and keeps a bounded history of past clears.
//!
//! ## Modules
//!
//! - [`api`]: contracts of the external removal and tab collaborators.
//! - [`registry`]: per-category scoping capabilities.
//! - [`dispatch`]: capability-aware batching and pacing of removal calls.
//! - [`refresh`]: reloading tabs that belong to a domain or wildcard.
//! - [`history`]: bounded, most-recent-first clean history.
//! - [`rules`]: reading cleaning rules and selecting the due ones.
//! - [`orchestrator`]: composes the above into one `clear` call.
//!
//! ## Failure policy
//!
//! Removal failures fail the whole clear. Tab reload and persistence
//! failures are logged and swallowed; they never turn a successful clear
//! into a failed one.

pub mod api;
pub mod dispatch;
pub mod history;
pub mod orchestrator;
pub mod refresh;
pub mod registry;
pub mod rules;

pub use api::{ApiError, DataTypeFlags, RemovalApi, RemovalOptions, TabApi, TabInfo};
pub use dispatch::BatchDispatcher;
pub use history::HistoryLedger;
pub use orchestrator::{fully_succeeded, ClearingOrchestrator, RuleRun};
pub use refresh::TabRefreshMatcher;
pub use registry::CategoryRegistry;
pub use rules::{due_rules, rule_matches_host, RuleBook};

use sweep_types::UnknownCategory;

/// Error types for clearing operations.
#[derive(Debug, thiserror::Error)]
pub enum ClearError {
    /// One or more removal calls rejected. Carries the first rejection's
    /// message verbatim.
    #[error("removal failed: {0}")]
    RemovalFailed(String),

    /// A single tab could not be reloaded.
    #[error("refresh skipped for tab {tab_id}: {reason}")]
    TabRefreshSkipped { tab_id: i64, reason: String },

    /// A category has no capability entry.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// The history or rule store could not be read or written.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// The request is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<sweep_db::DbError> for ClearError {
    fn from(e: sweep_db::DbError) -> Self {
        ClearError::PersistenceUnavailable(e.to_string())
    }
}

impl ClearError {
    /// The message reported to the caller of a failed clear.
    pub fn user_message(&self) -> String {
        match self {
            ClearError::RemovalFailed(message) => message.clone(),
            ClearError::InvalidRequest(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience result type for clearing operations.
pub type Result<T> = std::result::Result<T, ClearError>;

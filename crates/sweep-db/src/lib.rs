//! # sweep-db
//!
//! Persisted key-value store for the Sweep host.
//! Backs the clean history and the cleaning rules, each under its own key,
//! in a single SQLite database at `$SWEEP_DATA_DIR/sweep.db`.
//!
//! ## Schema
//!
//! - WAL mode
//! - One `kv_store` table, values are JSON text
//! - Timestamps are Unix epoch milliseconds
//! - Schema version stored in `PRAGMA user_version`
//!
//! Callers treat a missing key as "empty"; there is no per-key schema
//! versioning.

pub mod migrations;
pub mod queries;
pub mod schema;
pub mod store;

use rusqlite::Connection;
use std::path::Path;

pub use store::{load_json, store_json, KeyValueStore, MemoryStore, SqliteStore};

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the Sweep database at the given path.
///
/// Configures WAL mode and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    prepare(Connection::open(path)?)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    migrations::run(&conn)?;
    Ok(conn)
}

//! Forward-only schema migrations.
//!
//! `PRAGMA user_version` holds the number of steps applied. Step `n` takes
//! the schema from version `n` to `n + 1`.

use rusqlite::Connection;
use tracing::info;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

const STEPS: &[&str] = &[schema::SCHEMA_V1];

/// Apply every step the database has not seen yet.
pub fn run(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database version {current} is newer than supported {SCHEMA_VERSION}"
        )));
    }

    for (index, step) in STEPS.iter().enumerate().skip(current as usize) {
        let target = index as u32 + 1;
        info!(from = index, to = target, "migrating store schema");
        let batch = format!("BEGIN;\n{step}\nPRAGMA user_version = {target};\nCOMMIT;");
        if let Err(e) = conn.execute_batch(&batch) {
            // Leaves the database at the last completed step.
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(DbError::Migration(format!("step to v{target}: {e}")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("version")
    }

    #[test]
    fn test_steps_match_schema_version() {
        assert_eq!(STEPS.len() as u32, SCHEMA_VERSION);
    }

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().expect("open");
        run(&conn).expect("migrate");
        assert_eq!(version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_rerun_is_noop() {
        let conn = Connection::open_in_memory().expect("open");
        run(&conn).expect("first run");
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', 'v', 0)",
            [],
        )
        .expect("insert");
        run(&conn).expect("second run");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_newer_database_rejected() {
        let conn = Connection::open_in_memory().expect("open");
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .expect("bump version");
        assert!(matches!(run(&conn), Err(DbError::Migration(_))));
    }
}

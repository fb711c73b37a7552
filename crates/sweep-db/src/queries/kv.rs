//! Key-value query functions.

use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// Get a value by key. A missing key is `None`.
pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Insert or replace a value.
pub fn set(conn: &Connection, key: &str, value: &str, updated_at: u64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, updated_at as i64],
    )?;
    Ok(())
}

/// Remove a key. Removing a missing key is not an error.
pub fn remove(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert_eq!(get(&conn, "nonexistent").expect("get"), None);
    }

    #[test]
    fn test_set_and_get() {
        let conn = test_db();
        set(&conn, "clean_history", "[]", 1).expect("set");
        assert_eq!(get(&conn, "clean_history").expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_replaces() {
        let conn = test_db();
        set(&conn, "k", "1", 1).expect("set");
        set(&conn, "k", "2", 2).expect("replace");
        assert_eq!(get(&conn, "k").expect("get").as_deref(), Some("2"));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_remove() {
        let conn = test_db();
        set(&conn, "k", "1", 1).expect("set");
        remove(&conn, "k").expect("remove");
        remove(&conn, "k").expect("remove missing");
        assert_eq!(get(&conn, "k").expect("get"), None);
    }
}

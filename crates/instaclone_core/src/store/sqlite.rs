//! SQLite-backed key-value store on the `kv_entries` table.
//!
//! # Invariants
//! - The connection must come from `db::open_db*` (migrations applied).
//! - `set_item` is an upsert; `updated_at` tracks the last write.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `Uninitialized` when the schema version is behind this build.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual = current_user_version(conn)?;
        let expected = latest_version();
        if actual < expected {
            return Err(StoreError::Uninitialized { expected, actual });
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::db::open_db_in_memory;
    use crate::store::{KeyValueStore, StoreError};
    use rusqlite::Connection;

    #[test]
    fn upsert_replaces_value() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteStore::try_new(&conn).unwrap();

        store.set_item("posts", "[]").unwrap();
        store.set_item("posts", "[1]").unwrap();
        assert_eq!(store.get_item("posts").unwrap().as_deref(), Some("[1]"));

        store.remove_item("posts").unwrap();
        assert_eq!(store.get_item("posts").unwrap(), None);
    }

    #[test]
    fn rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        match SqliteStore::try_new(&conn) {
            Err(StoreError::Uninitialized {
                expected,
                actual: 0,
            }) => assert!(expected > 0),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected uninitialized connection error"),
        }
    }
}

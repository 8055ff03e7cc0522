use super::{KvStorage, StorageError, validate_key};
use rusqlite::{Connection, OptionalExtension, params};
use std::{path::Path, time::Duration};

/// Busy timeout used for storage connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

/// Slots stored as rows of a single `kv` table.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`, apply runtime pragmas, and
    /// ensure the `kv` table exists.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        configure_connection(&conn)?;
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    /// Private in-memory database; gone when the value is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

impl KvStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, SqliteStorage};
    use crate::storage::{KvStorage, StorageError};

    #[test]
    fn open_sets_wal_and_busy_timeout() -> Result<(), StorageError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = SqliteStorage::open(&dir.path().join("nested/ticklist.sqlite3"))?;

        let journal_mode: String = storage
            .conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))?;
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = storage
            .conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))?;
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );
        Ok(())
    }

    #[test]
    fn upsert_replaces_value() -> Result<(), StorageError> {
        let storage = SqliteStorage::open_in_memory()?;
        assert_eq!(storage.get("todos")?, None);

        storage.set("todos", "[1]")?;
        storage.set("todos", "[]")?;
        assert_eq!(storage.get("todos")?.as_deref(), Some("[]"));

        storage.remove("todos")?;
        storage.remove("todos")?;
        assert_eq!(storage.get("todos")?, None);
        Ok(())
    }

    #[test]
    fn value_survives_reopen() -> Result<(), StorageError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ticklist.sqlite3");
        SqliteStorage::open(&path)?.set("todos", "[]")?;
        assert_eq!(SqliteStorage::open(&path)?.get("todos")?.as_deref(), Some("[]"));
        Ok(())
    }
}

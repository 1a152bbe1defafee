//! Durable key-value entries for the board and preference scalars.

use crate::repo::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Key holding the serialized board.
pub const BOARD_KEY: &str = "speaktiles-board-v1";

/// Single-writer string store keyed by stable names.
pub trait KeyValueRepository {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<R: KeyValueRepository + ?Sized> KeyValueRepository for &R {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed key-value repository over `kv_entries`.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
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

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local repository used where no durable medium is available.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueRepository, MemoryKvRepository, SqliteKvRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_put_overwrites_and_remove_clears() {
        let conn = open_db_in_memory().expect("open in-memory db");
        let repo = SqliteKvRepository::new(&conn);

        assert_eq!(repo.get("tile-size").expect("get"), None);
        repo.put("tile-size", "140").expect("first put");
        repo.put("tile-size", "180").expect("second put");
        assert_eq!(repo.get("tile-size").expect("get").as_deref(), Some("180"));

        repo.remove("tile-size").expect("remove");
        assert_eq!(repo.get("tile-size").expect("get"), None);
    }

    #[test]
    fn memory_repo_round_trips() {
        let repo = MemoryKvRepository::new();
        repo.put("show-emoji", "false").expect("put");
        assert_eq!(repo.get("show-emoji").expect("get").as_deref(), Some("false"));
    }
}

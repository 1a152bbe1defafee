//! Cache generations: named sets of URL → response entries.
//!
//! # Invariants
//! - `put_all` writes every entry or none.
//! - Deleting a generation removes all of its entries.

use crate::offline::request::ResourceResponse;
use crate::repo::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Storage for versioned cache generations.
pub trait CacheStorage {
    /// Names of every generation holding at least one entry.
    fn cache_names(&self) -> StorageResult<Vec<String>>;
    /// Stores all entries into `cache_name` atomically.
    fn put_all(&self, cache_name: &str, entries: &[(String, ResourceResponse)])
        -> StorageResult<()>;
    /// Stores or replaces one entry.
    fn put(&self, cache_name: &str, url: &str, response: &ResourceResponse) -> StorageResult<()>;
    fn lookup(&self, cache_name: &str, url: &str) -> StorageResult<Option<ResourceResponse>>;
    /// Drops a whole generation. Returns whether anything was removed.
    fn delete_cache(&self, cache_name: &str) -> StorageResult<bool>;
}

impl<S: CacheStorage + ?Sized> CacheStorage for &S {
    fn cache_names(&self) -> StorageResult<Vec<String>> {
        (**self).cache_names()
    }

    fn put_all(
        &self,
        cache_name: &str,
        entries: &[(String, ResourceResponse)],
    ) -> StorageResult<()> {
        (**self).put_all(cache_name, entries)
    }

    fn put(&self, cache_name: &str, url: &str, response: &ResourceResponse) -> StorageResult<()> {
        (**self).put(cache_name, url, response)
    }

    fn lookup(&self, cache_name: &str, url: &str) -> StorageResult<Option<ResourceResponse>> {
        (**self).lookup(cache_name, url)
    }

    fn delete_cache(&self, cache_name: &str) -> StorageResult<bool> {
        (**self).delete_cache(cache_name)
    }
}

const UPSERT_ENTRY_SQL: &str = "INSERT INTO cache_entries (
        cache_name,
        url,
        status,
        status_text,
        content_type,
        body
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(cache_name, url) DO UPDATE SET
        status = excluded.status,
        status_text = excluded.status_text,
        content_type = excluded.content_type,
        body = excluded.body,
        stored_at = (strftime('%s', 'now') * 1000);";

/// SQLite-backed cache storage over `cache_entries`.
pub struct SqliteCacheRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCacheRepository<'conn> {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CacheStorage for SqliteCacheRepository<'_> {
    fn cache_names(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT cache_name FROM cache_entries ORDER BY cache_name ASC;")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn put_all(
        &self,
        cache_name: &str,
        entries: &[(String, ResourceResponse)],
    ) -> StorageResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_ENTRY_SQL)?;
            for (url, response) in entries {
                stmt.execute(params![
                    cache_name,
                    url,
                    response.status,
                    response.status_text,
                    response.content_type,
                    response.body,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn put(&self, cache_name: &str, url: &str, response: &ResourceResponse) -> StorageResult<()> {
        self.conn.execute(
            UPSERT_ENTRY_SQL,
            params![
                cache_name,
                url,
                response.status,
                response.status_text,
                response.content_type,
                response.body,
            ],
        )?;
        Ok(())
    }

    fn lookup(&self, cache_name: &str, url: &str) -> StorageResult<Option<ResourceResponse>> {
        let response = self
            .conn
            .query_row(
                "SELECT status, status_text, content_type, body
                 FROM cache_entries
                 WHERE cache_name = ?1 AND url = ?2;",
                params![cache_name, url],
                |row| {
                    Ok(ResourceResponse {
                        status: row.get("status")?,
                        status_text: row.get("status_text")?,
                        content_type: row.get("content_type")?,
                        body: row.get("body")?,
                    })
                },
            )
            .optional()?;
        Ok(response)
    }

    fn delete_cache(&self, cache_name: &str) -> StorageResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM cache_entries WHERE cache_name = ?1;",
            [cache_name],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheStorage, SqliteCacheRepository};
    use crate::db::open_db_in_memory;
    use crate::offline::request::ResourceResponse;

    #[test]
    fn generations_are_isolated_and_deletable() {
        let conn = open_db_in_memory().expect("open in-memory db");
        let repo = SqliteCacheRepository::new(&conn);
        let page = ResourceResponse::ok(Some("text/html"), "<html></html>");

        repo.put_all("v1", &[("https://app.test/".to_string(), page.clone())])
            .expect("put v1");
        repo.put("v2", "https://app.test/", &page).expect("put v2");

        assert_eq!(repo.cache_names().expect("names"), ["v1", "v2"]);
        assert_eq!(
            repo.lookup("v1", "https://app.test/").expect("lookup"),
            Some(page)
        );
        assert_eq!(repo.lookup("v1", "https://app.test/missing").expect("lookup"), None);

        assert!(repo.delete_cache("v1").expect("delete"));
        assert!(!repo.delete_cache("v1").expect("delete again"));
        assert_eq!(repo.cache_names().expect("names"), ["v2"]);
    }
}

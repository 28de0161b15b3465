//! SQLite-backed record store.
//!
//! All namespaces share the `records` table keyed by `(namespace, key)`.

use super::{Namespace, RecordStore, StoreResult};
use log::error;
use rusqlite::{params, Connection, OptionalExtension};

/// Durable store over a migrated connection (see [`crate::db::open_db`]).
#[derive(Clone, Copy)]
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO records (namespace, key, value)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value;",
                params![namespace.as_str(), key, value],
            )
            .map_err(|err| {
                error!("event=record_put module=store status=error namespace={namespace} error={err}");
                err
            })?;
        Ok(())
    }

    fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE namespace = ?1 AND key = ?2;",
                params![namespace.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "DELETE FROM records WHERE namespace = ?1 AND key = ?2;",
                params![namespace.as_str(), key],
            )
            .map_err(|err| {
                error!("event=record_delete module=store status=error namespace={namespace} error={err}");
                err
            })?;
        Ok(())
    }

    fn list_entries(&self, namespace: Namespace) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT key, value FROM records WHERE namespace = ?1;")?;
        let mut rows = stmt.query([namespace.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push((row.get("key")?, row.get("value")?));
        }
        Ok(entries)
    }
}

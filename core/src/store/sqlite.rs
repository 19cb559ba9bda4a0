use super::{KvStore, Staged, WriteSet};
use crate::error::{SimResult, StorageError};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed `KvStore`. Every key lives under `namespace`; staged
/// writes are flushed in one transaction on `commit`.
pub struct SqliteStore {
    conn:      Connection,
    namespace: String,
    staged:    WriteSet,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str, namespace: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self::with_connection(conn, namespace))
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory(namespace: &str) -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::with_connection(conn, namespace))
    }

    fn with_connection(conn: Connection, namespace: &str) -> Self {
        Self {
            conn,
            namespace: namespace.to_string(),
            staged: WriteSet::default(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_kv_store.sql"))?;
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.staged.is_empty()
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.staged.lookup(key) {
            Staged::Value(v) => return Ok(Some(v.to_vec())),
            Staged::Erased => return Ok(None),
            Staged::Untouched => {}
        }
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.staged.set(key, value);
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<(), StorageError> {
        self.staged.erase(key);
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        self.staged.clear_all();
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        if self.staged.is_cleared() {
            tx.execute("DELETE FROM kv_store WHERE namespace = ?1", params![self.namespace])?;
        }
        for (key, value) in self.staged.iter() {
            match value {
                Some(v) => {
                    tx.execute(
                        "INSERT INTO kv_store (namespace, key, value) VALUES (?1, ?2, ?3)
                         ON CONFLICT(namespace, key) DO UPDATE
                         SET value = excluded.value, updated_at = strftime('%s', 'now')",
                        params![self.namespace, key, v],
                    )?;
                }
                None => {
                    tx.execute(
                        "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
                        params![self.namespace, key],
                    )?;
                }
            }
        }
        tx.commit()?;
        let (_, entries) = self.staged.take();
        log::debug!("kv commit: {} keys in '{}'", entries.len(), self.namespace);
        Ok(())
    }
}

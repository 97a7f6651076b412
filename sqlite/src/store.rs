//! SQLite-backed key-value store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use shellsense_db::{KeyValueStore, StoreError};

use crate::error::{Result, SqliteError};
use crate::schema::{generate_drop_sql, generate_schema_sql, kv_table, validate_prefix};

/// Row counts reported by [`SqliteStore::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus {
    pub tables_exist: bool,
    pub key_count: usize,
}

/// Key-value store over a SQLite connection.
///
/// The connection sits behind a shared mutex; each operation is a single
/// short statement, so the lock is held only for its duration. Clones share
/// the connection. The [`KeyValueStore`] methods run on tokio's blocking
/// pool so a slow disk never stalls the async runtime.
///
/// # Examples
///
/// ```
/// use shellsense_sqlite::SqliteStore;
///
/// let store = SqliteStore::open_in_memory("ss_").unwrap();
/// store.put_value("history", "[]").unwrap();
/// assert_eq!(store.get_value("history").unwrap().as_deref(), Some("[]"));
/// assert_eq!(store.status().unwrap().key_count, 1);
/// ```
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    prefix: String,
}

impl SqliteStore {
    /// Wraps a connection and creates the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] if the prefix contains invalid
    /// characters, or a migration error if the table cannot be created.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            prefix,
        };
        store.up()?;
        Ok(store)
    }

    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::new(conn, prefix)
    }

    pub fn open_in_memory(prefix: impl Into<String>) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Creates the table. Safe to call repeatedly.
    pub fn up(&self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    /// Drops the table and everything in it.
    pub fn down(&self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    pub fn status(&self) -> Result<StoreStatus> {
        let table = kv_table(&self.prefix);
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(StoreStatus {
                tables_exist: false,
                key_count: 0,
            });
        }
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(StoreStatus {
            tables_exist: true,
            key_count: usize::try_from(count).unwrap_or_default(),
        })
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let table = kv_table(&self.prefix);
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                &format!("SELECT value FROM {table} WHERE key = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let table = kv_table(&self.prefix);
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT INTO {table} (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at"
            ),
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    /// Removes `key`, returning whether it existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let table = kv_table(&self.prefix);
        let conn = self.conn.lock();
        let removed = conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), params![key])?;
        Ok(removed > 0)
    }

    /// All keys in lexicographic order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let table = kv_table(&self.prefix);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT key FROM {table} ORDER BY key"))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Runs `op` against a clone of `store` on the blocking thread pool.
async fn run_blocking<T, F>(store: &SqliteStore, op: F) -> shellsense_db::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|err| StoreError::Backend(format!("sqlite task failed: {err}")))?
        .map_err(StoreError::from)
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> shellsense_db::Result<Option<String>> {
        let key = key.to_string();
        run_blocking(self, move |store| store.get_value(&key)).await
    }

    async fn put(&self, key: &str, value: &str) -> shellsense_db::Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        run_blocking(self, move |store| store.put_value(&key, &value)).await
    }
}

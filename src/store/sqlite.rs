//! Local object store on SQLite: one row per object plus its settable header rows.

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{
    Enumerator, MetadataReader, MetadataWriter, ObjectIter, StoreError, WriteOption, WriteOptions,
};
use crate::catalog::STAT_ACL;
use crate::engine::encode::format_http_date;
use crate::utils::config::PipelineConsts;
use crate::{HeaderName, Metadata, ObjectId};

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// `objects` holds what the service manages itself; `object_headers` holds only settable headers.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS objects (
    key TEXT PRIMARY KEY,
    size INTEGER NOT NULL DEFAULT 0,
    acl TEXT NOT NULL DEFAULT 'default',
    last_modified TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS object_headers (
    key TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (key, name)
);
"#;

const INSERT_HEADER_SQL: &str =
    "INSERT OR REPLACE INTO object_headers (key, name, value) VALUES (?1, ?2, ?3)";

/// User-metadata rows only. Names are stored lower-cased.
const DELETE_USER_META_SQL: &str =
    "DELETE FROM object_headers WHERE key = ?1 AND substr(name, 1, 11) = 'x-oss-meta-'";

/// Keys under `?1`, after marker `?2`, in lexical order. `substr` keeps the match case-sensitive.
const LIST_PAGE_SQL: &str = "SELECT key FROM objects \
     WHERE substr(key, 1, length(?1)) = ?1 AND key > ?2 \
     ORDER BY key LIMIT ?3";

/// Enable WAL and apply schema to an open connection (idempotent).
fn apply_wal_and_schema(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(())
}

/// Open or create the store file and ensure schema + WAL.
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    let conn = Connection::open(path)
        .with_context(|| format!("open object store {}", path.display()))?;
    apply_wal_and_schema(&conn)?;
    Ok(SqliteStore::new(conn))
}

/// Open an in-memory store with the same schema (no WAL pragmas needed).
pub fn open_store_in_memory() -> Result<SqliteStore> {
    let conn = Connection::open_in_memory().context("open in-memory object store")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(SqliteStore::new(conn))
}

/// SQLite-backed store. The connection sits behind a mutex so workers can share the store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    page_size: usize,
}

impl SqliteStore {
    fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            page_size: PipelineConsts::LIST_PAGE_SIZE,
        }
    }

    /// Number of keys fetched per listing query.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Create the object if missing (or set its size) and write `options` as its settable metadata.
    pub fn put_object(
        &self,
        object: &str,
        size: u64,
        options: &WriteOptions,
    ) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO objects (key, size, last_modified) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET size = excluded.size",
            params![object, size as i64, format_http_date(&Utc::now())],
        )?;
        tx.execute("DELETE FROM object_headers WHERE key = ?1", [object])?;
        rewrite_headers(&tx, object, options)?;
        tx.commit()?;
        Ok(())
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))?;
        Ok(n.max(0) as usize)
    }

    fn list_page(&self, prefix: &str, marker: &str) -> Result<Vec<ObjectId>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(LIST_PAGE_SQL)?;
        let rows = stmt.query_map(params![prefix, marker, self.page_size as i64], |row| {
            row.get::<_, String>(0)
        })?;
        let mut keys = Vec::with_capacity(self.page_size);
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}

/// Rewrite the metadata of `object` from `options`. User-metadata rows are replaced as a set;
/// recognized headers are upserted when present and kept when absent. The ACL changes only when
/// an ACL option is given.
fn rewrite_headers(tx: &Transaction<'_>, object: &str, options: &WriteOptions) -> Result<(), StoreError> {
    tx.execute(DELETE_USER_META_SQL, [object])?;
    let mut insert = tx.prepare_cached(INSERT_HEADER_SQL)?;
    for option in options {
        if let WriteOption::Acl(acl) = option {
            tx.execute(
                "UPDATE objects SET acl = ?2 WHERE key = ?1",
                params![object, acl.as_str()],
            )?;
        } else if let Some((name, value)) = option.to_header() {
            insert.execute(params![object, name, value])?;
        }
    }
    tx.execute(
        "UPDATE objects SET last_modified = ?2 WHERE key = ?1",
        params![object, format_http_date(&Utc::now())],
    )?;
    Ok(())
}

/// Pages through keys with a marker so listing stays lazy.
struct KeyPages<'a> {
    store: &'a SqliteStore,
    prefix: String,
    marker: String,
    page: VecDeque<ObjectId>,
    exhausted: bool,
}

impl Iterator for KeyPages<'_> {
    type Item = Result<ObjectId, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            match self.store.list_page(&self.prefix, &self.marker) {
                Ok(keys) => {
                    self.exhausted = keys.len() < self.store.page_size;
                    if let Some(last) = keys.last() {
                        self.marker = last.clone();
                    }
                    debug!("listed {} keys under {:?}", keys.len(), self.prefix);
                    self.page.extend(keys);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
        self.page.pop_front().map(Ok)
    }
}

impl Enumerator for SqliteStore {
    fn enumerate<'a>(&'a self, prefix: &str) -> Result<ObjectIter<'a>, StoreError> {
        Ok(Box::new(KeyPages {
            store: self,
            prefix: prefix.to_string(),
            marker: String::new(),
            page: VecDeque::new(),
            exhausted: false,
        }))
    }
}

impl MetadataReader for SqliteStore {
    fn fetch_existing(&self, object: &str) -> Result<Metadata, StoreError> {
        let conn = self.lock()?;
        let (size, acl, last_modified): (i64, String, String) = conn
            .query_row(
                "SELECT size, acl, last_modified FROM objects WHERE key = ?1",
                [object],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(object.to_string()))?;

        let mut meta = Metadata::new();
        let mut stmt = conn.prepare_cached("SELECT name, value FROM object_headers WHERE key = ?1")?;
        let rows = stmt.query_map([object], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (name, value) = row?;
            meta.insert(HeaderName::new(&name), value);
        }
        meta.insert(HeaderName::new("Content-Length"), size.max(0).to_string());
        meta.insert(HeaderName::new("Last-Modified"), last_modified);
        meta.insert(HeaderName::new(STAT_ACL), acl);
        Ok(meta)
    }
}

impl MetadataWriter for SqliteStore {
    fn apply_metadata(&self, object: &str, options: &WriteOptions) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM objects WHERE key = ?1", [object], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound(object.to_string()));
        }
        rewrite_headers(&tx, object, options)?;
        tx.commit()?;
        Ok(())
    }
}

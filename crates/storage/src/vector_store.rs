//! sqlite-vec backed vector collections.
//!
//! Each collection is a plain table `(id, text, embedding BLOB)`; a catalog
//! table records its dimension and row count. Nearest-neighbour lookups are
//! exact scans ordered by `vec_distance_l2`.
//!
//! Reset-on-init policy: [`VectorStore::open`] drops every collection left
//! in the database file by an earlier process. Nothing survives a restart.

// SQLite uses i64 for counts, Rust uses usize - conversions stay within row counts
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within row counts"
)]

use std::path::Path;

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use ragchat_core::DocumentRow;
use rusqlite::{OptionalExtension as _, params};
use serde::Serialize;
use zerocopy::IntoBytes as _;

use crate::error::StorageError;
use crate::vec_init::{extension_version, register_sqlite_vec};

const TABLE_PREFIX: &str = "coll_";
const POOL_MAX_SIZE: u32 = 4;

type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Closest stored row for a query vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub text: String,
    /// L2 distance between the query and the row embedding.
    pub distance: f64,
}

/// Catalog entry for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimension: usize,
    pub row_count: usize,
    pub created_at: String,
}

/// Local vector database wrapping an `SQLite` connection pool.
#[derive(Clone, Debug)]
pub struct VectorStore {
    pool: Pool<SqliteConnectionManager>,
}

impl VectorStore {
    /// Opens (or creates) the database at `path` and applies the reset-on-init
    /// policy.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the pool cannot
    /// connect, or the reset fails.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        register_sqlite_vec();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(POOL_MAX_SIZE).build(manager)?;
        let store = Self { pool };
        store.ensure_catalog()?;

        let dropped = store.reset_all()?;
        tracing::info!(path = %path.display(), dropped, "vector store opened");
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConn, StorageError> {
        Ok(self.pool.get()?)
    }

    fn ensure_catalog(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let vec_version = extension_version(&conn)?;
        tracing::debug!(vec_version = %vec_version, "sqlite-vec available");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS collections (
                name       TEXT PRIMARY KEY,
                dimension  INTEGER NOT NULL,
                row_count  INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Drops every collection table and empties the catalog. Returns the
    /// number of tables dropped.
    ///
    /// # Errors
    /// Returns an error on SQL failure.
    pub fn reset_all(&self) -> Result<usize, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let tables: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE ?1 ESCAPE '\\'",
            )?;
            let pattern = format!("{}%", TABLE_PREFIX.replace('_', "\\_"));
            stmt.query_map(params![pattern], |row| row.get(0))?
                .collect::<Result<_, _>>()?
        };
        for table in &tables {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))?;
        }
        tx.execute("DELETE FROM collections", [])?;
        tx.commit()?;

        if !tables.is_empty() {
            tracing::info!(dropped = tables.len(), "dropped existing vector collections");
        }
        Ok(tables.len())
    }

    /// Replaces `name` with `rows`, discarding whatever was there. Returns the
    /// number of rows written.
    ///
    /// # Errors
    /// Rejects invalid names, zero-length embeddings and mixed dimensions.
    pub fn replace_collection(
        &self,
        name: &str,
        rows: &[DocumentRow],
    ) -> Result<usize, StorageError> {
        let table = table_name(name)?;
        let dimension = uniform_dimension(rows)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\";
             CREATE TABLE \"{table}\" (
                id        INTEGER PRIMARY KEY,
                text      TEXT NOT NULL,
                embedding BLOB NOT NULL
             );"
        ))?;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO \"{table}\" (text, embedding) VALUES (?1, ?2)"))?;
            for row in rows {
                stmt.execute(params![row.text, row.embedding.as_slice().as_bytes()])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO collections (name, dimension, row_count, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, dimension as i64, rows.len() as i64, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        tracing::debug!(collection = name, rows = rows.len(), dimension, "collection replaced");
        Ok(rows.len())
    }

    /// Returns the single closest row, or `None` if the collection is missing
    /// or empty. No distance threshold is applied here.
    ///
    /// # Errors
    /// Returns an error on SQL failure or when `query` does not match the
    /// collection's dimension.
    pub fn nearest(&self, name: &str, query: &[f32]) -> Result<Option<Neighbor>, StorageError> {
        let table = table_name(name)?;
        if query.is_empty() {
            return Err(StorageError::EmptyEmbedding);
        }

        let conn = self.conn()?;
        let Some(info) = collection_info(&conn, name)? else {
            return Ok(None);
        };
        if info.row_count == 0 {
            return Ok(None);
        }
        if info.dimension != query.len() {
            return Err(StorageError::DimensionMismatch {
                expected: info.dimension,
                actual: query.len(),
            });
        }

        let neighbor = conn
            .query_row(
                &format!(
                    "SELECT text, vec_distance_l2(embedding, ?1) AS distance
                     FROM \"{table}\"
                     ORDER BY distance ASC, id ASC
                     LIMIT 1"
                ),
                params![query.as_bytes()],
                |row| Ok(Neighbor { text: row.get(0)?, distance: row.get(1)? }),
            )
            .optional()?;
        Ok(neighbor)
    }

    /// Stored row texts in insertion order.
    ///
    /// # Errors
    /// Returns an error on SQL failure.
    pub fn texts(&self, name: &str) -> Result<Vec<String>, StorageError> {
        let table = table_name(name)?;
        let conn = self.conn()?;
        if collection_info(&conn, name)?.is_none() {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&format!("SELECT text FROM \"{table}\" ORDER BY id ASC"))?;
        let texts = stmt.query_map([], |row| row.get(0))?.collect::<Result<_, _>>()?;
        Ok(texts)
    }

    /// Catalog entry for `name`, if it exists.
    ///
    /// # Errors
    /// Returns an error on SQL failure.
    pub fn info(&self, name: &str) -> Result<Option<CollectionInfo>, StorageError> {
        table_name(name)?;
        collection_info(&self.conn()?, name)
    }

    /// Names of every collection in the catalog.
    ///
    /// # Errors
    /// Returns an error on SQL failure.
    pub fn collection_names(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get(0))?.collect::<Result<_, _>>()?;
        Ok(names)
    }

    /// Drops one collection. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error on SQL failure.
    pub fn drop_collection(&self, name: &str) -> Result<bool, StorageError> {
        let table = table_name(name)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))?;
        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

fn collection_info(conn: &PooledConn, name: &str) -> Result<Option<CollectionInfo>, StorageError> {
    let info = conn
        .query_row(
            "SELECT name, dimension, row_count, created_at FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok(CollectionInfo {
                    name: row.get(0)?,
                    dimension: row.get::<_, i64>(1)? as usize,
                    row_count: row.get::<_, i64>(2)? as usize,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(info)
}

fn table_name(name: &str) -> Result<String, StorageError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("{TABLE_PREFIX}{name}"))
    } else {
        Err(StorageError::InvalidCollectionName(name.to_owned()))
    }
}

/// Dimension shared by all rows; 0 for an empty set.
fn uniform_dimension(rows: &[DocumentRow]) -> Result<usize, StorageError> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let expected = first.dimension();
    if expected == 0 {
        return Err(StorageError::EmptyEmbedding);
    }
    if let Some(bad) = rows.iter().find(|r| r.dimension() != expected) {
        return Err(StorageError::DimensionMismatch { expected, actual: bad.dimension() });
    }
    Ok(expected)
}

//! Term-scoped key/value metadata.
//!
//! # Responsibility
//! - Store one JSON value per `(term_id, meta_key)`.
//!
//! # Invariants
//! - `update_term_meta` is a single upsert statement (last write wins).
//! - Missing rows read as `None`; unreadable JSON is reported as
//!   `RepoError::InvalidData`.

use crate::model::term::TermId;
use crate::repo::term_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Metadata store offered by the host.
pub trait TermMetaStore {
    fn get_term_meta(&self, term_id: TermId, key: &str) -> RepoResult<Option<Value>>;
    /// Creates or overwrites the value stored under `key`.
    fn update_term_meta(&self, term_id: TermId, key: &str, value: &Value) -> RepoResult<()>;
    /// Removes the record. Returns whether one existed.
    fn delete_term_meta(&self, term_id: TermId, key: &str) -> RepoResult<bool>;
}

pub struct SqliteTermMetaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTermMetaRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Returns whether a raw row exists, regardless of its value.
    pub fn has_term_meta(&self, term_id: TermId, key: &str) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM term_meta WHERE term_id = ?1 AND meta_key = ?2
            );",
            params![term_id, key],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl TermMetaStore for SqliteTermMetaRepository<'_> {
    fn get_term_meta(&self, term_id: TermId, key: &str) -> RepoResult<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT meta_value FROM term_meta WHERE term_id = ?1 AND meta_key = ?2;",
                params![term_id, key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|err| {
                RepoError::InvalidData(format!(
                    "term_meta `{key}` of term {term_id} is not valid JSON: {err}"
                ))
            })
        })
        .transpose()
    }

    fn update_term_meta(&self, term_id: TermId, key: &str, value: &Value) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO term_meta (term_id, meta_key, meta_value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(term_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value;",
            params![term_id, key, value.to_string()],
        )?;
        Ok(())
    }

    fn delete_term_meta(&self, term_id: TermId, key: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM term_meta WHERE term_id = ?1 AND meta_key = ?2;",
            params![term_id, key],
        )?;
        Ok(changed > 0)
    }
}

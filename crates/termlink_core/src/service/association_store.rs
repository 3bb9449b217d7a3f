//! Relation store: per-term set of associated term ids.
//!
//! # Responsibility
//! - Read and fully replace one term's association set.
//!
//! # Invariants
//! - An empty set is never persisted; `set` with no ids deletes the record.
//! - Absent or malformed stored data reads as an empty set.
//! - Ids are not validated on write; readers skip what no longer resolves.
//! - The relation is one-way: writing A's set never touches B's.

use crate::model::term::TermId;
use crate::repo::meta_repo::TermMetaStore;
use crate::repo::term_repo::{RepoError, RepoResult};
use crate::service::input::coerce_int;
use log::warn;
use serde_json::Value;
use std::collections::BTreeSet;

/// Metadata key under which association sets are stored.
pub const ASSOCIATED_TERMS_META_KEY: &str = "associated_terms";

pub struct AssociationStore<M: TermMetaStore> {
    meta: M,
}

impl<M: TermMetaStore> AssociationStore<M> {
    pub fn new(meta: M) -> Self {
        Self { meta }
    }

    /// Returns the stored set for `term_id`, or an empty set.
    pub fn get(&self, term_id: TermId) -> RepoResult<BTreeSet<TermId>> {
        let value = match self.meta.get_term_meta(term_id, ASSOCIATED_TERMS_META_KEY) {
            Ok(value) => value,
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=association_read module=service status=degraded term_id={term_id} reason=unreadable_meta detail={message}"
                );
                return Ok(BTreeSet::new());
            }
            Err(err) => return Err(err),
        };

        Ok(match value {
            None => BTreeSet::new(),
            Some(Value::Array(items)) => items.iter().filter_map(parse_stored_id).collect(),
            Some(_) => {
                warn!(
                    "event=association_read module=service status=degraded term_id={term_id} reason=not_an_array"
                );
                BTreeSet::new()
            }
        })
    }

    /// Replaces the stored set. An empty `ids` removes the record.
    pub fn set(&self, term_id: TermId, ids: &BTreeSet<TermId>) -> RepoResult<()> {
        if ids.is_empty() {
            self.clear(term_id)?;
            return Ok(());
        }

        let value = Value::Array(ids.iter().map(|id| Value::from(*id)).collect());
        self.meta
            .update_term_meta(term_id, ASSOCIATED_TERMS_META_KEY, &value)
    }

    /// Deletes the stored set. Returns whether one existed.
    pub fn clear(&self, term_id: TermId) -> RepoResult<bool> {
        self.meta
            .delete_term_meta(term_id, ASSOCIATED_TERMS_META_KEY)
    }
}

fn parse_stored_id(value: &Value) -> Option<TermId> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => Some(coerce_int(text)).filter(|id| *id != 0),
        _ => None,
    }
}

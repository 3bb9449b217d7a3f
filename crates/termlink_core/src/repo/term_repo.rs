//! Term directory contract and SQLite implementation.
//!
//! # Responsibility
//! - Answer taxonomy/term lookups for editors and renderers.
//! - Resolve canonical term links from site settings.
//! - Provide term writes for the reference host (tools and tests).
//!
//! # Invariants
//! - `get_term` only resolves a term inside the requested taxonomy; a foreign
//!   or deleted id yields `None`.
//! - `list_terms` is ordered by name, then id.

use crate::config::SiteConfig;
use crate::db::DbError;
use crate::model::term::{NewTerm, Taxonomy, Term, TermId, TermValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TERM_SELECT_SQL: &str = "SELECT
    id,
    taxonomy,
    name,
    slug,
    description,
    parent_id
FROM terms";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by the reference host repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(TermValidationError),
    TermNotFound(TermId),
    TaxonomyNotFound(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::TermNotFound(id) => write!(f, "term not found: {id}"),
            Self::TaxonomyNotFound(name) => write!(f, "taxonomy not registered: {name}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::TermNotFound(_) | Self::TaxonomyNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TermValidationError> for RepoError {
    fn from(value: TermValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Listing request for the terms of one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermListQuery {
    pub taxonomy: String,
}

impl TermListQuery {
    /// Every term of `taxonomy`, including unused ones.
    pub fn all(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
        }
    }
}

/// Read-side term directory offered by the host.
pub trait TermDirectory {
    fn taxonomy_exists(&self, taxonomy: &str) -> RepoResult<bool>;
    fn get_taxonomy(&self, taxonomy: &str) -> RepoResult<Option<Taxonomy>>;
    /// All registered taxonomies, ordered by name.
    fn list_taxonomies(&self) -> RepoResult<Vec<Taxonomy>>;
    fn list_terms(&self, query: &TermListQuery) -> RepoResult<Vec<Term>>;
    fn get_term(&self, term_id: TermId, taxonomy: &str) -> RepoResult<Option<Term>>;
    /// Canonical listing URL for one term.
    fn term_link(&self, term: &Term) -> RepoResult<String>;
}

/// SQLite-backed term directory.
pub struct SqliteTermRepository<'conn> {
    conn: &'conn Connection,
    site: SiteConfig,
}

impl<'conn> SqliteTermRepository<'conn> {
    /// Uses default site settings for links.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_site(conn, SiteConfig::default())
    }

    pub fn with_site(conn: &'conn Connection, site: SiteConfig) -> Self {
        Self { conn, site }
    }

    /// Registers or updates one taxonomy. Re-registering is an upsert.
    pub fn register_taxonomy(&self, taxonomy: &Taxonomy) -> RepoResult<()> {
        taxonomy.validate()?;
        self.conn.execute(
            "INSERT INTO taxonomies (name, label, is_public, hierarchical, rewrite_slug)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                label = excluded.label,
                is_public = excluded.is_public,
                hierarchical = excluded.hierarchical,
                rewrite_slug = excluded.rewrite_slug;",
            params![
                taxonomy.name.as_str(),
                taxonomy.label.as_str(),
                taxonomy.public,
                taxonomy.hierarchical,
                taxonomy.rewrite_slug.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Inserts one term and returns it with the assigned id.
    pub fn create_term(&self, term: &NewTerm) -> RepoResult<Term> {
        term.validate()?;
        let taxonomy = self
            .get_taxonomy(&term.taxonomy)?
            .ok_or_else(|| RepoError::TaxonomyNotFound(term.taxonomy.clone()))?;
        if let Some(parent) = term.parent {
            if !taxonomy.hierarchical {
                return Err(TermValidationError::ParentOnFlatTaxonomy(taxonomy.name).into());
            }
            if self.get_term(parent, &term.taxonomy)?.is_none() {
                return Err(RepoError::TermNotFound(parent));
            }
        }

        let slug = term.effective_slug();
        self.conn.execute(
            "INSERT INTO terms (taxonomy, name, slug, description, parent_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                term.taxonomy.as_str(),
                term.name.trim(),
                slug.as_str(),
                term.description.as_str(),
                term.parent,
            ],
        )?;

        Ok(Term {
            id: self.conn.last_insert_rowid(),
            taxonomy: term.taxonomy.clone(),
            name: term.name.trim().to_string(),
            slug,
            description: term.description.clone(),
            parent: term.parent,
        })
    }

    /// Hard-deletes one term. Its own metadata and post links go with it;
    /// references held by other terms are left alone.
    pub fn delete_term(&self, term_id: TermId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM terms WHERE id = ?1;", [term_id])?;
        if changed == 0 {
            return Err(RepoError::TermNotFound(term_id));
        }
        Ok(())
    }
}

impl TermDirectory for SqliteTermRepository<'_> {
    fn taxonomy_exists(&self, taxonomy: &str) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM taxonomies WHERE name = ?1);",
            [taxonomy],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get_taxonomy(&self, taxonomy: &str) -> RepoResult<Option<Taxonomy>> {
        let found = self
            .conn
            .query_row(
                "SELECT name, label, is_public, hierarchical, rewrite_slug
                 FROM taxonomies
                 WHERE name = ?1;",
                [taxonomy],
                parse_taxonomy_row,
            )
            .optional()?;
        Ok(found)
    }

    fn list_taxonomies(&self) -> RepoResult<Vec<Taxonomy>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, label, is_public, hierarchical, rewrite_slug
             FROM taxonomies
             ORDER BY name ASC;",
        )?;
        let taxonomies = stmt
            .query_map([], parse_taxonomy_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(taxonomies)
    }

    fn list_terms(&self, query: &TermListQuery) -> RepoResult<Vec<Term>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TERM_SELECT_SQL} WHERE taxonomy = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([query.taxonomy.as_str()])?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }

    fn get_term(&self, term_id: TermId, taxonomy: &str) -> RepoResult<Option<Term>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TERM_SELECT_SQL} WHERE id = ?1 AND taxonomy = ?2;"
        ))?;
        let mut rows = stmt.query(params![term_id, taxonomy])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_term_row(row)?)),
            None => Ok(None),
        }
    }

    fn term_link(&self, term: &Term) -> RepoResult<String> {
        let taxonomy = self
            .get_taxonomy(&term.taxonomy)?
            .ok_or_else(|| RepoError::TaxonomyNotFound(term.taxonomy.clone()))?;
        Ok(self.site.term_link(taxonomy.link_base(), &term.slug))
    }
}

fn parse_taxonomy_row(row: &Row<'_>) -> rusqlite::Result<Taxonomy> {
    Ok(Taxonomy {
        name: row.get("name")?,
        label: row.get("label")?,
        public: row.get("is_public")?,
        hierarchical: row.get("hierarchical")?,
        rewrite_slug: row.get("rewrite_slug")?,
    })
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<Term> {
    let id: TermId = row.get("id")?;
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "non-positive term id `{id}` in terms.id"
        )));
    }
    Ok(Term {
        id,
        taxonomy: row.get("taxonomy")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        parent: row.get("parent_id")?,
    })
}

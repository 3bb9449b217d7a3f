//! Content query contract and SQLite implementation.
//!
//! # Responsibility
//! - Express "tagged with one of these terms" filters, combined with AND,
//!   and run them against stored posts.
//! - Build post permalinks from site settings.
//!
//! # Invariants
//! - Results are ordered by `published_at DESC, id DESC`.
//! - `include_children` widens a clause to every descendant of its terms,
//!   but only in hierarchical taxonomies.
//! - Results are owned rows; running a query leaves no state behind.

use crate::config::SiteConfig;
use crate::model::post::{NewPost, PostId, PostStatus, PostSummary, DEFAULT_POST_TYPE};
use crate::model::term::TermId;
use crate::repo::term_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeSet;

/// One taxonomy condition: the post is tagged with at least one of `terms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxClause {
    pub taxonomy: String,
    pub terms: Vec<TermId>,
    pub include_children: bool,
}

impl TaxClause {
    /// Clause that also matches descendant terms.
    pub fn any_of(taxonomy: impl Into<String>, terms: Vec<TermId>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            terms,
            include_children: true,
        }
    }

    /// Matches exactly the given terms, without descendants.
    pub fn exact(mut self) -> Self {
        self.include_children = false;
        self
    }
}

/// Clauses that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxQuery {
    pub clauses: Vec<TaxClause>,
}

impl TaxQuery {
    pub fn all_of(clauses: Vec<TaxClause>) -> Self {
        Self { clauses }
    }
}

/// Unlimited query over posts of one type and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub post_type: String,
    pub status: PostStatus,
    pub tax_query: TaxQuery,
}

impl PostQuery {
    /// Published posts of the default type.
    pub fn new(tax_query: TaxQuery) -> Self {
        Self {
            post_type: DEFAULT_POST_TYPE.to_string(),
            status: PostStatus::Publish,
            tax_query,
        }
    }
}

/// Content query engine offered by the host.
pub trait ContentQuery {
    fn query_posts(&self, query: &PostQuery) -> RepoResult<Vec<PostSummary>>;
}

pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
    site: SiteConfig,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_site(conn, SiteConfig::default())
    }

    pub fn with_site(conn: &'conn Connection, site: SiteConfig) -> Self {
        Self { conn, site }
    }

    /// Inserts one post and its term relationships atomically.
    pub fn create_post(&self, post: &NewPost) -> RepoResult<PostId> {
        if post.title.trim().is_empty() {
            return Err(RepoError::InvalidData("post title must not be empty".into()));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO posts (post_type, status, title, slug, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                post.post_type.as_str(),
                post.status.as_str(),
                post.title.trim(),
                post.slug.as_str(),
                post.published_at,
            ],
        )?;
        let post_id = tx.last_insert_rowid();

        for term_id in post.term_ids.iter().collect::<BTreeSet<_>>() {
            let changed = tx.execute(
                "INSERT INTO term_relationships (post_id, term_id)
                 SELECT ?1, id FROM terms WHERE id = ?2;",
                params![post_id, term_id],
            )?;
            if changed == 0 {
                return Err(RepoError::TermNotFound(*term_id));
            }
        }
        tx.commit()?;
        Ok(post_id)
    }

    fn is_hierarchical(&self, taxonomy: &str) -> RepoResult<bool> {
        let hierarchical = self
            .conn
            .query_row(
                "SELECT hierarchical FROM taxonomies WHERE name = ?1;",
                [taxonomy],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;
        Ok(hierarchical.unwrap_or(false))
    }

    fn expand_descendants(&self, taxonomy: &str, roots: &[TermId]) -> RepoResult<Vec<TermId>> {
        let mut expanded = roots.iter().copied().collect::<BTreeSet<_>>();
        if roots.is_empty() || !self.is_hierarchical(taxonomy)? {
            return Ok(expanded.into_iter().collect());
        }

        let placeholders = vec!["?"; roots.len()].join(", ");
        let sql = format!(
            "WITH RECURSIVE tree(id) AS (
                SELECT id FROM terms WHERE taxonomy = ? AND id IN ({placeholders})
                UNION
                SELECT t.id FROM terms t INNER JOIN tree ON t.parent_id = tree.id
             )
             SELECT id FROM tree;"
        );
        let mut bind_values = vec![Value::Text(taxonomy.to_string())];
        bind_values.extend(roots.iter().map(|id| Value::Integer(*id)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        while let Some(row) = rows.next()? {
            expanded.insert(row.get(0)?);
        }
        Ok(expanded.into_iter().collect())
    }

    fn clause_sql(
        &self,
        clause: &TaxClause,
        bind_values: &mut Vec<Value>,
    ) -> RepoResult<String> {
        let terms = if clause.include_children {
            self.expand_descendants(&clause.taxonomy, &clause.terms)?
        } else {
            clause.terms.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
        };
        if terms.is_empty() {
            return Ok("1 = 0".to_string());
        }

        bind_values.push(Value::Text(clause.taxonomy.clone()));
        bind_values.extend(terms.iter().map(|id| Value::Integer(*id)));
        Ok(format!(
            "EXISTS (
                SELECT 1
                FROM term_relationships tr
                INNER JOIN terms t ON t.id = tr.term_id
                WHERE tr.post_id = p.id
                  AND t.taxonomy = ?
                  AND tr.term_id IN ({})
            )",
            vec!["?"; terms.len()].join(", ")
        ))
    }
}

impl ContentQuery for SqlitePostRepository<'_> {
    fn query_posts(&self, query: &PostQuery) -> RepoResult<Vec<PostSummary>> {
        let mut sql = String::from(
            "SELECT p.id, p.title, p.slug
             FROM posts p
             WHERE p.post_type = ?
               AND p.status = ?",
        );
        let mut bind_values = vec![
            Value::Text(query.post_type.clone()),
            Value::Text(query.status.as_str().to_string()),
        ];

        for clause in &query.tax_query.clauses {
            let condition = self.clause_sql(clause, &mut bind_values)?;
            sql.push_str(&format!(" AND {condition}"));
        }
        sql.push_str(" ORDER BY p.published_at DESC, p.id DESC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            let id: PostId = row.get("id")?;
            let slug: String = row.get("slug")?;
            posts.push(PostSummary {
                id,
                title: row.get("title")?,
                permalink: self.site.post_permalink(id, &slug),
            });
        }
        Ok(posts)
    }
}

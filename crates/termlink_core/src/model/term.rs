//! Taxonomy and term model.
//!
//! # Invariants
//! - `Taxonomy::name` is the registry key and never changes after creation.
//! - `Term::slug` is unique within its taxonomy.
//! - A term's `parent` lives in the same taxonomy.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer identifier assigned by the host to each term.
pub type TermId = i64;

/// Named classification namespace, e.g. `category` or `post_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    pub label: String,
    /// Only public taxonomies are covered by the default integration.
    pub public: bool,
    pub hierarchical: bool,
    /// URL segment used for term links; falls back to `name`.
    pub rewrite_slug: Option<String>,
}

impl Taxonomy {
    /// Creates a public, flat taxonomy whose label equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            public: true,
            hierarchical: false,
            rewrite_slug: None,
        }
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn with_rewrite_slug(mut self, slug: impl Into<String>) -> Self {
        self.rewrite_slug = Some(slug.into());
        self
    }

    /// Segment placed before the term slug in term links.
    pub fn link_base(&self) -> &str {
        self.rewrite_slug.as_deref().unwrap_or(self.name.as_str())
    }

    pub fn validate(&self) -> Result<(), TermValidationError> {
        if !is_valid_key(&self.name) {
            return Err(TermValidationError::InvalidTaxonomyName(self.name.clone()));
        }
        Ok(())
    }
}

/// One term as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: Option<TermId>,
}

/// Insert request for a term; the host assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerm {
    pub taxonomy: String,
    pub name: String,
    /// Derived from `name` when empty.
    pub slug: String,
    pub description: String,
    pub parent: Option<TermId>,
}

impl NewTerm {
    pub fn new(taxonomy: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            parent: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_parent(mut self, parent: TermId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the explicit slug, or one derived from the name.
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.name)
        } else {
            slugify(&self.slug)
        }
    }

    pub fn validate(&self) -> Result<(), TermValidationError> {
        if self.name.trim().is_empty() {
            return Err(TermValidationError::EmptyName);
        }
        if self.effective_slug().is_empty() {
            return Err(TermValidationError::EmptySlug);
        }
        Ok(())
    }
}

/// Validation failures for host entity writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermValidationError {
    EmptyName,
    EmptySlug,
    InvalidTaxonomyName(String),
    /// A parent was given for a term of a flat taxonomy.
    ParentOnFlatTaxonomy(String),
}

impl Display for TermValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "term name must not be empty"),
            Self::EmptySlug => write!(f, "term slug must contain at least one alphanumeric"),
            Self::InvalidTaxonomyName(name) => write!(
                f,
                "taxonomy name `{name}` must be 1-32 chars of [a-z0-9_-]"
            ),
            Self::ParentOnFlatTaxonomy(name) => {
                write!(f, "taxonomy `{name}` is not hierarchical; terms cannot have a parent")
            }
        }
    }
}

impl Error for TermValidationError {}

/// Lowercases, maps runs of non-alphanumerics to `-`, trims dashes.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn is_valid_key(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 32
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
}

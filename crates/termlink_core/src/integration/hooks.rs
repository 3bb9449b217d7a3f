//! Static hook registration for covered taxonomies.
//!
//! # Responsibility
//! - Bind the four editor hooks of every covered taxonomy once at startup.
//! - Route host events to a `TaxonomyIntegration`.
//!
//! # Invariants
//! - A taxonomy is bound at most once; all four hooks or none.
//! - Events for unbound hooks are rejected, never silently handled.

use crate::model::term::{Taxonomy, Term, TermId};
use crate::repo::meta_repo::TermMetaStore;
use crate::repo::term_repo::{RepoError, RepoResult, TermDirectory};
use crate::service::editor::{AssociationEditor, SaveOutcome, SubmittedField};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ADD_FORM_FIELDS_SUFFIX: &str = "_add_form_fields";
const EDIT_FORM_FIELDS_SUFFIX: &str = "_edit_form_fields";
const CREATED_PREFIX: &str = "created_";
const EDITED_PREFIX: &str = "edited_";

/// The four per-taxonomy extension points the editor hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookKind {
    AddFormFields,
    EditFormFields,
    Created,
    Edited,
}

impl HookKind {
    pub const ALL: [Self; 4] = [
        Self::AddFormFields,
        Self::EditFormFields,
        Self::Created,
        Self::Edited,
    ];

    /// Host hook name for this kind on `taxonomy`.
    pub fn hook_name(self, taxonomy: &str) -> String {
        match self {
            Self::AddFormFields => format!("{taxonomy}{ADD_FORM_FIELDS_SUFFIX}"),
            Self::EditFormFields => format!("{taxonomy}{EDIT_FORM_FIELDS_SUFFIX}"),
            Self::Created => format!("{CREATED_PREFIX}{taxonomy}"),
            Self::Edited => format!("{EDITED_PREFIX}{taxonomy}"),
        }
    }
}

/// Splits a host hook name into kind and taxonomy.
pub fn parse_hook_name(name: &str) -> Option<(HookKind, String)> {
    let (kind, taxonomy) = if let Some(taxonomy) = name.strip_suffix(ADD_FORM_FIELDS_SUFFIX) {
        (HookKind::AddFormFields, taxonomy)
    } else if let Some(taxonomy) = name.strip_suffix(EDIT_FORM_FIELDS_SUFFIX) {
        (HookKind::EditFormFields, taxonomy)
    } else if let Some(taxonomy) = name.strip_prefix(CREATED_PREFIX) {
        (HookKind::Created, taxonomy)
    } else if let Some(taxonomy) = name.strip_prefix(EDITED_PREFIX) {
        (HookKind::Edited, taxonomy)
    } else {
        return None;
    };

    if taxonomy.is_empty() {
        return None;
    }
    Some((kind, taxonomy.to_string()))
}

/// Which taxonomies get the association editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomySelection {
    /// Every public taxonomy.
    #[default]
    AllPublic,
    /// Exactly these taxonomies, public or not.
    Only(Vec<String>),
    /// Every public taxonomy except these.
    Except(Vec<String>),
}

impl TaxonomySelection {
    pub fn matches(&self, taxonomy: &Taxonomy) -> bool {
        match self {
            Self::AllPublic => taxonomy.public,
            Self::Only(names) => names.iter().any(|name| *name == taxonomy.name),
            Self::Except(names) => {
                taxonomy.public && !names.iter().any(|name| *name == taxonomy.name)
            }
        }
    }
}

/// Capability a host integration provides for each covered taxonomy.
pub trait TaxonomyIntegration {
    fn on_field_render_create(&self, taxonomy: &str) -> RepoResult<String>;
    fn on_field_render_edit(&self, term: &Term) -> RepoResult<String>;
    fn on_save(&self, term_id: TermId, submission: &SubmittedField) -> RepoResult<SaveOutcome>;
}

/// Association editor exposed as a taxonomy integration.
pub struct AssociationIntegration<D: TermDirectory, M: TermMetaStore> {
    editor: AssociationEditor<D, M>,
}

impl<D: TermDirectory, M: TermMetaStore> AssociationIntegration<D, M> {
    pub fn new(editor: AssociationEditor<D, M>) -> Self {
        Self { editor }
    }
}

impl<D: TermDirectory, M: TermMetaStore> TaxonomyIntegration for AssociationIntegration<D, M> {
    fn on_field_render_create(&self, taxonomy: &str) -> RepoResult<String> {
        self.editor.render_create_field(taxonomy)
    }

    fn on_field_render_edit(&self, term: &Term) -> RepoResult<String> {
        self.editor.render_edit_field(term)
    }

    fn on_save(&self, term_id: TermId, submission: &SubmittedField) -> RepoResult<SaveOutcome> {
        self.editor.save(term_id, submission)
    }
}

/// One event fired by the host.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    AddFormFields {
        taxonomy: &'a str,
    },
    EditFormFields {
        term: &'a Term,
    },
    Created {
        taxonomy: &'a str,
        term_id: TermId,
        submission: &'a SubmittedField,
    },
    Edited {
        taxonomy: &'a str,
        term_id: TermId,
        submission: &'a SubmittedField,
    },
}

impl HookEvent<'_> {
    pub fn kind(&self) -> HookKind {
        match self {
            Self::AddFormFields { .. } => HookKind::AddFormFields,
            Self::EditFormFields { .. } => HookKind::EditFormFields,
            Self::Created { .. } => HookKind::Created,
            Self::Edited { .. } => HookKind::Edited,
        }
    }

    pub fn taxonomy(&self) -> &str {
        match self {
            Self::AddFormFields { taxonomy }
            | Self::Created { taxonomy, .. }
            | Self::Edited { taxonomy, .. } => *taxonomy,
            Self::EditFormFields { term } => term.taxonomy.as_str(),
        }
    }

    pub fn hook_name(&self) -> String {
        self.kind().hook_name(self.taxonomy())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Form field markup to inject.
    Markup(String),
    Saved(SaveOutcome),
}

#[derive(Debug)]
pub enum HookError {
    NotBound(String),
    DuplicateTaxonomy(String),
    Repo(RepoError),
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotBound(hook) => write!(f, "hook is not registered: {hook}"),
            Self::DuplicateTaxonomy(name) => write!(f, "taxonomy already registered: {name}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotBound(_) | Self::DuplicateTaxonomy(_) => None,
        }
    }
}

impl From<RepoError> for HookError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Registration table from hook name to `(kind, taxonomy)`.
#[derive(Debug, Default)]
pub struct HookRegistry {
    bindings: BTreeMap<String, (HookKind, String)>,
    taxonomies: BTreeSet<String>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every taxonomy `selection` covers. Returns how many were bound.
    pub fn register(
        &mut self,
        directory: &impl TermDirectory,
        selection: &TaxonomySelection,
    ) -> Result<usize, HookError> {
        self.register_filtered(directory, |taxonomy| selection.matches(taxonomy))
    }

    /// Binds every registered taxonomy accepted by `predicate`.
    pub fn register_filtered(
        &mut self,
        directory: &impl TermDirectory,
        predicate: impl Fn(&Taxonomy) -> bool,
    ) -> Result<usize, HookError> {
        let covered = directory
            .list_taxonomies()?
            .into_iter()
            .filter(|taxonomy| predicate(taxonomy))
            .collect::<Vec<_>>();

        if let Some(duplicate) = covered
            .iter()
            .find(|taxonomy| self.taxonomies.contains(&taxonomy.name))
        {
            return Err(HookError::DuplicateTaxonomy(duplicate.name.clone()));
        }

        for taxonomy in &covered {
            self.bind_taxonomy(&taxonomy.name)?;
        }
        info!(
            "event=hook_register module=integration status=ok taxonomies={} hooks={}",
            covered.len(),
            self.bindings.len()
        );
        Ok(covered.len())
    }

    /// Binds the four hooks of one taxonomy by name.
    pub fn bind_taxonomy(&mut self, taxonomy: &str) -> Result<(), HookError> {
        if !self.taxonomies.insert(taxonomy.to_string()) {
            return Err(HookError::DuplicateTaxonomy(taxonomy.to_string()));
        }
        for kind in HookKind::ALL {
            self.bindings
                .insert(kind.hook_name(taxonomy), (kind, taxonomy.to_string()));
        }
        Ok(())
    }

    pub fn is_bound(&self, hook_name: &str) -> bool {
        self.bindings.contains_key(hook_name)
    }

    /// Bound hook names in sorted order.
    pub fn hook_names(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    pub fn taxonomies(&self) -> Vec<&str> {
        self.taxonomies.iter().map(String::as_str).collect()
    }

    /// Routes one host event to `integration`.
    pub fn dispatch(
        &self,
        integration: &impl TaxonomyIntegration,
        event: HookEvent<'_>,
    ) -> Result<HookOutcome, HookError> {
        let hook_name = event.hook_name();
        if !self.is_bound(&hook_name) {
            return Err(HookError::NotBound(hook_name));
        }

        let outcome = match event {
            HookEvent::AddFormFields { taxonomy } => {
                HookOutcome::Markup(integration.on_field_render_create(taxonomy)?)
            }
            HookEvent::EditFormFields { term } => {
                HookOutcome::Markup(integration.on_field_render_edit(term)?)
            }
            HookEvent::Created {
                term_id,
                submission,
                ..
            }
            | HookEvent::Edited {
                term_id,
                submission,
                ..
            } => HookOutcome::Saved(integration.on_save(term_id, submission)?),
        };
        Ok(outcome)
    }
}

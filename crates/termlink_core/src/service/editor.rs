//! Association editor: admin form fields and the save path.
//!
//! # Responsibility
//! - Render the multi-select field for the term creation and edit screens.
//! - Turn a submitted selection into a full replacement of the stored set.
//!
//! # Invariants
//! - The edit field never offers the edited term itself.
//! - A missing, scalar or empty submission clears the stored set.
//! - Submitted values are coerced, not validated.

use crate::model::term::{Term, TermId};
use crate::repo::meta_repo::TermMetaStore;
use crate::repo::term_repo::{RepoResult, TermDirectory, TermListQuery};
use crate::service::association_store::{AssociationStore, ASSOCIATED_TERMS_META_KEY};
use crate::service::html::{esc_attr, esc_html};
use crate::service::input::coerce_int;
use log::info;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// CSS class picked up by the searchable multi-select init script.
pub const SELECT_CLASS: &str = "associated-taxonomies-select2";
const FIELD_LABEL: &str = "Associated Terms";
const FIELD_DESCRIPTION: &str = "Select terms to associate with this one.";

/// The `associated_terms[]` form field as received from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedField {
    /// Field absent from the request (nothing selected).
    Missing,
    /// Field present but not a list; treated like `Missing`.
    Scalar(String),
    List(Vec<String>),
}

impl From<Vec<String>> for SubmittedField {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Option<Vec<String>>> for SubmittedField {
    fn from(values: Option<Vec<String>>) -> Self {
        values.map_or(Self::Missing, Self::List)
    }
}

/// Result of one editor save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored a set with this many ids.
    Stored(usize),
    Cleared,
}

pub struct AssociationEditor<D: TermDirectory, M: TermMetaStore> {
    directory: D,
    store: AssociationStore<M>,
}

impl<D: TermDirectory, M: TermMetaStore> AssociationEditor<D, M> {
    pub fn new(directory: D, store: AssociationStore<M>) -> Self {
        Self { directory, store }
    }

    /// Field for the "add term" screen: every term, nothing pre-selected.
    pub fn render_create_field(&self, taxonomy: &str) -> RepoResult<String> {
        let terms = self.directory.list_terms(&TermListQuery::all(taxonomy))?;
        let options = render_options(terms.iter(), &BTreeSet::new());

        Ok(format!(
            "<div class=\"form-field term-group\">\
             <label for=\"{ASSOCIATED_TERMS_META_KEY}\">{FIELD_LABEL}</label>\
             {select}\
             <p class=\"description\">{FIELD_DESCRIPTION}</p>\
             </div>",
            select = render_select(&options),
        ))
    }

    /// Field for the "edit term" screen: every other term of the same
    /// taxonomy, with the stored associations pre-selected.
    pub fn render_edit_field(&self, term: &Term) -> RepoResult<String> {
        let selected = self.store.get(term.id)?;
        let terms = self
            .directory
            .list_terms(&TermListQuery::all(term.taxonomy.as_str()))?;
        let options = render_options(
            terms.iter().filter(|candidate| candidate.id != term.id),
            &selected,
        );

        Ok(format!(
            "<tr class=\"form-field term-group-wrap\">\
             <th scope=\"row\"><label for=\"{ASSOCIATED_TERMS_META_KEY}\">{FIELD_LABEL}</label></th>\
             <td>{select}<p class=\"description\">{FIELD_DESCRIPTION}</p></td>\
             </tr>",
            select = render_select(&options),
        ))
    }

    /// Saves the submitted selection for a created or edited term.
    pub fn save(&self, term_id: TermId, submission: &SubmittedField) -> RepoResult<SaveOutcome> {
        let ids = match submission {
            SubmittedField::List(values) => values
                .iter()
                .map(|value| coerce_int(value))
                .collect::<BTreeSet<_>>(),
            SubmittedField::Missing | SubmittedField::Scalar(_) => BTreeSet::new(),
        };

        let outcome = if ids.is_empty() {
            self.store.clear(term_id)?;
            SaveOutcome::Cleared
        } else {
            self.store.set(term_id, &ids)?;
            SaveOutcome::Stored(ids.len())
        };

        info!(
            "event=association_save module=service status=ok term_id={term_id} outcome={}",
            match outcome {
                SaveOutcome::Stored(_) => "stored",
                SaveOutcome::Cleared => "cleared",
            }
        );
        Ok(outcome)
    }
}

fn render_select(options: &str) -> String {
    format!(
        "<select name=\"{ASSOCIATED_TERMS_META_KEY}[]\" id=\"{ASSOCIATED_TERMS_META_KEY}\" class=\"{SELECT_CLASS}\" multiple>{options}</select>"
    )
}

fn render_options<'a>(terms: impl Iterator<Item = &'a Term>, selected: &BTreeSet<TermId>) -> String {
    let mut out = String::new();
    for term in terms {
        let marker = if selected.contains(&term.id) {
            " selected=\"selected\""
        } else {
            ""
        };
        let _ = write!(
            out,
            "<option value=\"{}\"{marker}>{}</option>",
            esc_attr(&term.id.to_string()),
            esc_html(&term.name)
        );
    }
    out
}

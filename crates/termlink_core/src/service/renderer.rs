//! Association renderer: a term plus links to its associated terms.
//!
//! # Invariants
//! - Preconditions are checked in order (id, taxonomy, term) and the first
//!   failure short-circuits to `Notice::InvalidTerm`.
//! - Associated ids that do not resolve inside the same taxonomy are skipped.
//! - Rendering is read-only; identical inputs give identical output.

use crate::model::term::{Term, TermId};
use crate::repo::meta_repo::TermMetaStore;
use crate::repo::term_repo::{RepoResult, TermDirectory};
use crate::service::association_store::AssociationStore;
use crate::service::fragment::{Fragment, Notice};
use crate::service::html::{esc_html, esc_url};
use crate::service::input::{coerce_int, sanitize_text_field};
use log::debug;
use std::fmt::Write as _;

pub struct AssociationRenderer<D: TermDirectory, M: TermMetaStore> {
    directory: D,
    store: AssociationStore<M>,
}

impl<D: TermDirectory, M: TermMetaStore> AssociationRenderer<D, M> {
    pub fn new(directory: D, store: AssociationStore<M>) -> Self {
        Self { directory, store }
    }

    /// Renders from untrusted embed attributes.
    pub fn render_raw(&self, id: &str, taxonomy: &str) -> RepoResult<Fragment> {
        self.render(coerce_int(id), &sanitize_text_field(taxonomy))
    }

    pub fn render(&self, term_id: TermId, taxonomy: &str) -> RepoResult<Fragment> {
        let Some(term) = self.resolve_owner(term_id, taxonomy)? else {
            debug!(
                "event=association_render module=service status=rejected term_id={term_id}"
            );
            return Ok(Fragment::Notice(Notice::InvalidTerm));
        };

        let mut associated = Vec::new();
        for id in self.store.get(term.id)? {
            match self.directory.get_term(id, taxonomy)? {
                Some(target) => {
                    let link = self.directory.term_link(&target)?;
                    associated.push((target, link));
                }
                None => debug!(
                    "event=association_render module=service status=skipped term_id={} target_id={id}",
                    term.id
                ),
            }
        }

        debug!(
            "event=association_render module=service status=ok term_id={} resolved={}",
            term.id,
            associated.len()
        );
        Ok(Fragment::Html(render_wrapper(&term, &associated)))
    }

    fn resolve_owner(&self, term_id: TermId, taxonomy: &str) -> RepoResult<Option<Term>> {
        if term_id == 0 || !self.directory.taxonomy_exists(taxonomy)? {
            return Ok(None);
        }
        self.directory.get_term(term_id, taxonomy)
    }
}

fn render_wrapper(term: &Term, associated: &[(Term, String)]) -> String {
    let mut out = String::from("<div class=\"associated-terms-wrapper\">");
    let _ = write!(
        out,
        "<div class=\"parent-term\"><h2>{}</h2><p class=\"description\">{}</p></div>",
        esc_html(&term.name),
        esc_html(&term.description)
    );

    if associated.is_empty() {
        out.push_str(&Notice::NoAssociatedTerms.to_html());
    } else {
        out.push_str("<ul class=\"associated-terms-list\">");
        for (target, link) in associated {
            let _ = write!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                esc_url(link),
                esc_html(&target.name)
            );
        }
        out.push_str("</ul>");
    }

    out.push_str("</div>");
    out
}

//! Cross-term post query: posts tagged with a parent term AND at least one
//! of several child terms.
//!
//! # Invariants
//! - The parent matches exactly; child clauses also match descendants.
//! - Child ids are used as given. A `0` produced by coercion stays in the
//!   list and simply matches nothing.
//! - Result order is the content query default (newest first).

use crate::model::term::TermId;
use crate::repo::post_repo::{ContentQuery, PostQuery, TaxClause, TaxQuery};
use crate::repo::term_repo::{RepoResult, TermDirectory};
use crate::service::fragment::{Fragment, Notice};
use crate::service::html::{esc_html, esc_url};
use crate::service::input::{coerce_int, parse_id_list, sanitize_text_field};
use log::debug;
use std::fmt::Write as _;

pub struct CrossTermPostQuery<D: TermDirectory, Q: ContentQuery> {
    directory: D,
    content: Q,
}

impl<D: TermDirectory, Q: ContentQuery> CrossTermPostQuery<D, Q> {
    pub fn new(directory: D, content: Q) -> Self {
        Self { directory, content }
    }

    /// Queries from untrusted embed attributes; `child` is comma-separated.
    pub fn query_raw(&self, parent: &str, child: &str, taxonomy: &str) -> RepoResult<Fragment> {
        self.query(
            coerce_int(parent),
            &parse_id_list(child),
            &sanitize_text_field(taxonomy),
        )
    }

    pub fn query(
        &self,
        parent_id: TermId,
        child_ids: &[TermId],
        taxonomy: &str,
    ) -> RepoResult<Fragment> {
        if parent_id == 0 || child_ids.is_empty() || !self.directory.taxonomy_exists(taxonomy)? {
            debug!("event=cross_term_query module=service status=rejected parent_id={parent_id}");
            return Ok(Fragment::Notice(Notice::InvalidQueryTerms));
        }

        let query = PostQuery::new(TaxQuery::all_of(vec![
            TaxClause::any_of(taxonomy, vec![parent_id]).exact(),
            TaxClause::any_of(taxonomy, child_ids.to_vec()),
        ]));
        let posts = self.content.query_posts(&query)?;
        debug!(
            "event=cross_term_query module=service status=ok parent_id={parent_id} children={} hits={}",
            child_ids.len(),
            posts.len()
        );

        if posts.is_empty() {
            return Ok(Fragment::Notice(Notice::NoPostsFound));
        }

        let mut out = String::from("<ul class=\"parent-child-posts-list\">");
        for post in &posts {
            let _ = write!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                esc_url(&post.permalink),
                esc_html(&post.title)
            );
        }
        out.push_str("</ul>");
        Ok(Fragment::Html(out))
    }
}

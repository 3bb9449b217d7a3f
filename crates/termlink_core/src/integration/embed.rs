//! Parameterized embeds (shortcodes) placed in page content.
//!
//! ```text
//! [related_terms id="123" taxonomy="category"]
//! [posts_by_related_terms parent="12" child="34,56" taxonomy="category"]
//! ```
//!
//! # Invariants
//! - Embed rendering never fails the page: storage errors are logged and
//!   render as an empty string.
//! - Unknown tags and unclosed brackets are left in the content untouched.

use crate::repo::meta_repo::TermMetaStore;
use crate::repo::post_repo::ContentQuery;
use crate::repo::term_repo::{RepoResult, TermDirectory};
use crate::service::fragment::Fragment;
use crate::service::post_query::CrossTermPostQuery;
use crate::service::renderer::AssociationRenderer;
use log::error;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

pub const RELATED_TERMS_TAG: &str = "related_terms";
pub const POSTS_BY_RELATED_TERMS_TAG: &str = "posts_by_related_terms";

/// Only our own tags; attribute text never spans another bracket.
static EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\[({RELATED_TERMS_TAG}|{POSTS_BY_RELATED_TERMS_TAG})\b([^\[\]]*)\]"
    ))
    .expect("valid embed regex")
});
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z0-9_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'/]+))"#)
        .expect("valid attribute regex")
});

pub type EmbedAttributes = BTreeMap<String, String>;

/// Parses `key="value"`, `key='value'` and `key=value` pairs.
/// Keys are lowercased; later duplicates win.
pub fn parse_attributes(text: &str) -> EmbedAttributes {
    ATTRIBUTE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
            Some((key, value.as_str().to_string()))
        })
        .collect()
}

fn attribute<'a>(attrs: &'a EmbedAttributes, key: &str, default: &'a str) -> &'a str {
    attrs.get(key).map_or(default, String::as_str)
}

/// Renders the two embeds on top of the association services.
pub struct EmbedRenderer<'a, D: TermDirectory, M: TermMetaStore, Q: ContentQuery> {
    associations: &'a AssociationRenderer<D, M>,
    posts: &'a CrossTermPostQuery<D, Q>,
}

impl<'a, D: TermDirectory, M: TermMetaStore, Q: ContentQuery> EmbedRenderer<'a, D, M, Q> {
    pub fn new(
        associations: &'a AssociationRenderer<D, M>,
        posts: &'a CrossTermPostQuery<D, Q>,
    ) -> Self {
        Self {
            associations,
            posts,
        }
    }

    /// Renders one embed. Returns `None` when `tag` is not one of ours.
    pub fn render_embed(&self, tag: &str, attrs: &EmbedAttributes) -> Option<String> {
        let result = match tag {
            RELATED_TERMS_TAG => self.associations.render_raw(
                attribute(attrs, "id", "0"),
                attribute(attrs, "taxonomy", ""),
            ),
            POSTS_BY_RELATED_TERMS_TAG => self.posts.query_raw(
                attribute(attrs, "parent", ""),
                attribute(attrs, "child", ""),
                attribute(attrs, "taxonomy", ""),
            ),
            _ => return None,
        };
        Some(into_page_html(tag, result))
    }

    /// Replaces every known embed in `content` with its rendered fragment.
    pub fn expand(&self, content: &str) -> String {
        EMBED_RE
            .replace_all(content, |caps: &Captures<'_>| {
                let tag = &caps[1];
                let attrs = parse_attributes(&caps[2]);
                self.render_embed(tag, &attrs)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn into_page_html(tag: &str, result: RepoResult<Fragment>) -> String {
    match result {
        Ok(fragment) => fragment.into_html(),
        Err(err) => {
            error!("event=embed_render module=integration status=error tag={tag} error={err}");
            String::new()
        }
    }
}

//! Post model used by the cross-term query.

use crate::model::term::TermId;

pub type PostId = i64;

/// Content type queried by the cross-term post embed.
pub const DEFAULT_POST_TYPE: &str = "post";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Draft,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
        }
    }
}

/// Insert request for a post together with its term relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub post_type: String,
    pub status: PostStatus,
    pub title: String,
    pub slug: String,
    /// Epoch milliseconds; drives default result ordering.
    pub published_at: i64,
    pub term_ids: Vec<TermId>,
}

impl NewPost {
    /// Published `post` with the given title, date and terms.
    pub fn published(title: impl Into<String>, published_at: i64, term_ids: Vec<TermId>) -> Self {
        Self {
            post_type: DEFAULT_POST_TYPE.to_string(),
            status: PostStatus::Publish,
            title: title.into(),
            slug: String::new(),
            published_at,
            term_ids,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self
    }
}

/// Read model returned by content queries: what a list entry needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub permalink: String,
}

//! Display fragments returned by the read-side services.

use std::fmt::{Display, Formatter};

/// Terminal, user-visible message that replaces a rendered projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Association embed with zero id, unknown taxonomy or missing term.
    InvalidTerm,
    /// Cross-term embed with zero parent, empty children or unknown taxonomy.
    InvalidQueryTerms,
    NoPostsFound,
    /// Shown inside the association wrapper when nothing resolves.
    NoAssociatedTerms,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidTerm => "Invalid term ID or taxonomy.",
            Self::InvalidQueryTerms => {
                "Invalid parent or child terms provided, or invalid taxonomy."
            }
            Self::NoPostsFound => "No posts found for the specified terms.",
            Self::NoAssociatedTerms => "No associated terms found.",
        }
    }

    /// Paragraph markup used when the notice is embedded in a page.
    pub fn to_html(self) -> String {
        format!("<p>{}</p>", self.message())
    }
}

/// Output of a render call: either a notice or ready-to-embed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Notice(Notice),
    Html(String),
}

impl Fragment {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Notice(notice) => Some(*notice),
            Self::Html(_) => None,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            Self::Notice(notice) => notice.to_html(),
            Self::Html(html) => html,
        }
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice(notice) => f.write_str(&notice.to_html()),
            Self::Html(html) => f.write_str(html),
        }
    }
}

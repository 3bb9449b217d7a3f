//! Core logic for termlink: term-to-term associations and their renderers.
//! This crate owns the association contract; hosts plug in through `repo`
//! traits.

pub mod config;
pub mod db;
pub mod integration;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, IntegrationConfig, LoggingConfig, SiteConfig};
pub use integration::assets::{admin_assets, frontend_assets, AssetHandle, AssetKind};
pub use integration::embed::{
    parse_attributes, EmbedRenderer, POSTS_BY_RELATED_TERMS_TAG, RELATED_TERMS_TAG,
};
pub use integration::hooks::{
    parse_hook_name, AssociationIntegration, HookError, HookEvent, HookKind, HookOutcome,
    HookRegistry, TaxonomyIntegration, TaxonomySelection,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{NewPost, PostId, PostStatus, PostSummary, DEFAULT_POST_TYPE};
pub use model::term::{NewTerm, Taxonomy, Term, TermId, TermValidationError};
pub use repo::meta_repo::{SqliteTermMetaRepository, TermMetaStore};
pub use repo::post_repo::{ContentQuery, PostQuery, SqlitePostRepository, TaxClause, TaxQuery};
pub use repo::term_repo::{
    RepoError, RepoResult, SqliteTermRepository, TermDirectory, TermListQuery,
};
pub use service::association_store::{AssociationStore, ASSOCIATED_TERMS_META_KEY};
pub use service::editor::{AssociationEditor, SaveOutcome, SubmittedField};
pub use service::fragment::{Fragment, Notice};
pub use service::post_query::CrossTermPostQuery;
pub use service::renderer::AssociationRenderer;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Host seams and their SQLite implementations.
//!
//! # Responsibility
//! - Define the collaborator contracts the association layer consumes:
//!   term directory, term metadata store and content query engine.
//! - Keep SQL details inside the reference host.
//!
//! # Invariants
//! - Read paths report absence with `Option`/empty results, not errors.
//! - Only transport or corrupted-row failures surface as `RepoError`.

pub mod meta_repo;
pub mod post_repo;
pub mod term_repo;

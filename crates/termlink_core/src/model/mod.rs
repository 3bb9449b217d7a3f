//! Host entities the association layer reads from.
//!
//! # Responsibility
//! - Define taxonomy, term and post shapes shared by repositories and
//!   renderers.
//!
//! # Invariants
//! - Terms and posts are identified by positive integer ids.
//! - A term belongs to exactly one taxonomy.

pub mod post;
pub mod term;

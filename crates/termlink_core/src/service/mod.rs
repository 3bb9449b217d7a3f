//! Association use-case services.
//!
//! # Responsibility
//! - Own the association write path (store + editor save).
//! - Project stored associations and tagged posts into display fragments.
//! - Stay storage-agnostic: every service is generic over `repo` traits.

pub mod association_store;
pub mod editor;
pub mod fragment;
pub mod html;
pub mod input;
pub mod post_query;
pub mod renderer;

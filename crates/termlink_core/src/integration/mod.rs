//! Host-facing integration surface.
//!
//! # Responsibility
//! - Wire the association editor into per-taxonomy host hooks.
//! - Expose the embeds that page content can reference.
//! - Declare the admin and front-end assets the host should load.

pub mod assets;
pub mod embed;
pub mod hooks;

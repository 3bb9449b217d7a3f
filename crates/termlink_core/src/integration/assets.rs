//! Script and style declarations for the host asset loader.

use crate::core_version;
use crate::service::editor::SELECT_CLASS;

/// Admin screens that show the term forms.
const TERM_ADMIN_SCREENS: &[&str] = &["term.php", "edit-tags.php"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Style,
    /// Inline script attached to the handle in `AssetHandle::handle`.
    InlineScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub handle: &'static str,
    pub kind: AssetKind,
    /// Plugin-relative path, or the inline source for `InlineScript`.
    pub source: String,
    pub deps: Vec<&'static str>,
    pub version: &'static str,
    pub in_footer: bool,
}

/// Assets to enqueue on the admin screen identified by `hook_suffix`.
pub fn admin_assets(hook_suffix: &str) -> Vec<AssetHandle> {
    if !TERM_ADMIN_SCREENS.contains(&hook_suffix) {
        return Vec::new();
    }

    vec![
        AssetHandle {
            handle: "associated-taxonomies-select2-js",
            kind: AssetKind::Script,
            source: "assets/js/select2.min.js".to_string(),
            deps: vec!["jquery"],
            version: core_version(),
            in_footer: true,
        },
        AssetHandle {
            handle: "associated-taxonomies-select2-css",
            kind: AssetKind::Style,
            source: "assets/css/select2.min.css".to_string(),
            deps: Vec::new(),
            version: core_version(),
            in_footer: false,
        },
        AssetHandle {
            handle: "associated-taxonomies-select2-js",
            kind: AssetKind::InlineScript,
            source: select_init_script(),
            deps: Vec::new(),
            version: core_version(),
            in_footer: true,
        },
    ]
}

/// Stylesheet for the embeds on public pages.
pub fn frontend_assets() -> Vec<AssetHandle> {
    vec![AssetHandle {
        handle: "associated-taxonomies-css",
        kind: AssetKind::Style,
        source: "assets/css/associated-taxonomies.css".to_string(),
        deps: Vec::new(),
        version: core_version(),
        in_footer: false,
    }]
}

fn select_init_script() -> String {
    format!(
        "jQuery(document).ready(function($) {{ \
         $('.{SELECT_CLASS}').select2({{ placeholder: 'Select associated terms...', allowClear: true }}); \
         }});"
    )
}

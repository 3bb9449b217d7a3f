//! Explicit runtime configuration.
//!
//! # Responsibility
//! - Carry site URL, taxonomy coverage and logging settings as plain data.
//! - Parse JSON config files with serde defaults for every field.
//!
//! # Invariants
//! - An empty JSON object yields a usable configuration.
//! - `site_url` never ends with `/`.

use crate::integration::hooks::TaxonomySelection;
use crate::logging::default_log_level;
use crate::model::post::PostId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_SITE_URL: &str = "http://localhost";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub site: SiteConfig,
    pub integration: IntegrationConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Reads and parses one JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }
}

/// Site-level settings used to build term links and post permalinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

impl SiteConfig {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    fn base(&self) -> &str {
        self.site_url.trim().trim_end_matches('/')
    }

    /// `{site}/{base}/{slug}/`
    pub fn term_link(&self, link_base: &str, slug: &str) -> String {
        format!("{}/{link_base}/{slug}/", self.base())
    }

    /// `{site}/{slug}/`, or `{site}/?p={id}` for posts without a slug.
    pub fn post_permalink(&self, post_id: PostId, slug: &str) -> String {
        if slug.is_empty() {
            format!("{}/?p={post_id}", self.base())
        } else {
            format!("{}/{slug}/", self.base())
        }
    }
}

/// Which taxonomies receive the association editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub taxonomies: TaxonomySelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, SiteConfig};
    use crate::integration::hooks::TaxonomySelection;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config.site.site_url, "http://localhost");
        assert_eq!(config.integration.taxonomies, TaxonomySelection::AllPublic);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn parses_explicit_taxonomy_list() {
        let config = CoreConfig::from_json_str(
            r#"{"site":{"site_url":"https://example.com/"},
                "integration":{"taxonomies":{"only":["category","genre"]}}}"#,
        )
        .expect("config should parse");
        assert_eq!(
            config.integration.taxonomies,
            TaxonomySelection::Only(vec!["category".to_string(), "genre".to_string()])
        );
        assert_eq!(
            config.site.term_link("category", "news"),
            "https://example.com/category/news/"
        );
    }

    #[test]
    fn post_permalink_falls_back_to_query_form() {
        let site = SiteConfig::new("https://example.com");
        assert_eq!(site.post_permalink(7, ""), "https://example.com/?p=7");
        assert_eq!(site.post_permalink(7, "hello"), "https://example.com/hello/");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(CoreConfig::from_json_str("{").is_err());
    }
}

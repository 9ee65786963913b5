//! Engine configuration
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [diagrams]
//! enabled = true
//! primary_url = "https://kroki.io/mermaid/png"
//! fallback_base = "https://mermaid.ink"
//! timeout_secs = 10
//!
//! [templates]
//! dir = "templates"
//!
//! [docx]
//! template = "corporate.dotx"
//!
//! [deck]
//! locale = "en-US"
//! ```

use std::path::{Path, PathBuf};

use mdoffice_diagrams::RendererConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub diagrams: RendererConfig,
    pub templates: TemplateSettings,
    pub docx: DocxSettings,
    pub deck: DeckSettings,
}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// Where named templates live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub dir: PathBuf,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates"),
        }
    }
}

impl TemplateSettings {
    /// Path of a template file, relative paths resolved against `dir`
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }
}

/// Word output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocxSettings {
    /// `.docx`/`.dotx` every document is built on
    pub template: Option<String>,
}

/// Slide output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSettings {
    /// Run language used when the deck style sets none
    pub locale: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.diagrams.enabled);
        assert_eq!(config.diagrams.timeout_secs, 10);
        assert_eq!(config.templates.dir, PathBuf::from("templates"));
        assert_eq!(config.docx.template, None);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
[diagrams]
enabled = false
timeout_secs = 3

[templates]
dir = "/srv/templates"

[deck]
locale = "fr-FR"
"#,
        )
        .unwrap();

        assert!(!config.diagrams.enabled);
        assert_eq!(config.diagrams.timeout_secs, 3);
        assert_eq!(config.diagrams.primary_url, mdoffice_diagrams::DEFAULT_PRIMARY_URL);
        assert_eq!(config.deck.locale.as_deref(), Some("fr-FR"));
        assert_eq!(
            config.templates.resolve("corporate.potx"),
            PathBuf::from("/srv/templates/corporate.potx")
        );
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("[diagrams]\nenabled = \"yes\"").unwrap_err();
        assert_eq!(err.code(), "ENGINE005");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(EngineConfig::load("/nonexistent/mdoffice.toml").is_err());
    }
}

//! Deck style: theme colour, font family and free-form properties.
//!
//! ```toml
//! theme_color = "1F4E79"
//! font_family = "Segoe UI"
//!
//! [properties]
//! locale = "de-DE"
//! author = "Platform Team"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOCALE;
use crate::error::Result;

/// Accent colour of the built-in theme
pub const DEFAULT_ACCENT: &str = "4472C4";

/// Visual settings applied to every slide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckStyle {
    /// Title and accent colour, `RRGGBB` with or without a leading `#`
    pub theme_color: Option<String>,

    /// Latin typeface for every run
    pub font_family: Option<String>,

    /// Extra settings: `locale`, `author`, `template`
    pub properties: BTreeMap<String, String>,
}

impl DeckStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a style from TOML
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = Some(color.into());
        self
    }

    pub fn with_font_family(mut self, font: impl Into<String>) -> Self {
        self.font_family = Some(font.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Language tag for run properties
    pub fn locale(&self) -> &str {
        self.property("locale").unwrap_or(DEFAULT_LOCALE)
    }

    /// Author written to the core properties
    pub fn author(&self) -> Option<&str> {
        self.property("author")
    }

    /// Template name requested through the properties
    pub fn template(&self) -> Option<&str> {
        self.property("template")
    }

    /// Theme colour as six upper-case hex digits
    ///
    /// Values that are not a hex colour are ignored with a warning.
    pub fn theme_color_hex(&self) -> Option<String> {
        let raw = self.theme_color.as_deref()?.trim();
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(hex.to_ascii_uppercase())
        } else {
            log::warn!("Ignoring theme colour '{}': expected RRGGBB", raw);
            None
        }
    }

    /// Accent colour: the theme colour or the built-in accent
    pub fn accent_hex(&self) -> String {
        self.theme_color_hex()
            .unwrap_or_else(|| DEFAULT_ACCENT.to_string())
    }

    pub fn font(&self) -> Option<&str> {
        self.font_family.as_deref().filter(|f| !f.trim().is_empty())
    }
}

//! Error types for slide deck generation.

use mdoffice_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for deck operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while building a deck
#[derive(Error, Debug)]
pub enum PptxError {
    /// Template file not found or inaccessible
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Template is not a usable presentation package
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// XML parsing error while reading or patching template parts
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Packaging error from the shared OOXML layer
    #[error("Package error: {0}")]
    Ooxml(#[from] OoxmlError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error (for deck styles)
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PptxError {
    /// Create a template not found error
    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "PPTX001",
            Self::InvalidTemplate { .. } => "PPTX002",
            Self::Xml(_) => "PPTX003",
            Self::Ooxml(_) => "PPTX004",
            Self::Io(_) => "PPTX005",
            Self::Toml(_) => "PPTX006",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PptxError::template_not_found("corporate.potx");
        assert_eq!(err.code(), "PPTX001");
        assert!(err.to_string().contains("corporate.potx"));

        let err = PptxError::invalid_template("no slide layouts");
        assert_eq!(err.code(), "PPTX002");
        assert!(err.to_string().contains("no slide layouts"));
    }

    #[test]
    fn test_ooxml_errors_convert() {
        let err: PptxError = OoxmlError::DanglingImage("img-1".to_string()).into();
        assert_eq!(err.code(), "PPTX004");
        assert!(err.to_string().contains("img-1"));
    }
}

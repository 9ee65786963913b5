//! Error types for OOXML packaging

use thiserror::Error;

/// Errors that can occur while reading or assembling a package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the package
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// An element cannot be expressed in the target format
    #[error("Malformed element: {0}")]
    MalformedElement(String),

    /// Generated XML references an image that was never registered
    #[error("Image placeholder '{0}' has no image asset")]
    DanglingImage(String),

    /// A registered image is never referenced by any part
    #[error("Image asset '{0}' is not referenced by any part")]
    OrphanImage(String),

    /// The assembled package breaks a packaging rule
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// A template could not be read
    #[error("Template '{path}' could not be read: {source}")]
    Template {
        path: String,
        #[source]
        source: Box<OoxmlError>,
    },
}

impl OoxmlError {
    /// Attach a template path to an error raised while reading it
    pub fn in_template(self, path: impl Into<String>) -> Self {
        OoxmlError::Template {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;

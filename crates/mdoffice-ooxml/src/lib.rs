//! # mdoffice-ooxml
//!
//! Office Open XML packaging for mdoffice.
//!
//! The crate holds everything both output formats share:
//!
//! - [`Package`]: ordered part map read from and written to ZIP
//! - [`ContentTypes`] and [`Relationships`]: the two manifests every package carries
//! - [`MediaBinder`]: turns image placeholder tokens into relationship ids
//! - [`Assembler`]: builds a validated package, fresh or from a template
//! - [`FormatSerializer`]: the seam between the model and a concrete format
//!
//! and the word-processing format itself in [`docx`].
//!
//! # Example
//!
//! ```
//! use mdoffice_model::{Block, ElementDocument, ImageSet};
//! use mdoffice_ooxml::{DocxWriter, Package};
//!
//! let mut doc = ElementDocument::new();
//! doc.push(Block::paragraph("Hello, world"));
//!
//! let bytes = DocxWriter::new()
//!     .with_file_name("hello.docx")
//!     .generate(&doc, &ImageSet::new())
//!     .unwrap();
//! assert!(Package::from_bytes(&bytes).unwrap().contains("word/document.xml"));
//! ```

pub mod assembler;
pub mod binding;
pub mod content_types;
pub mod docx;
pub mod error;
pub mod package;
pub mod relationships;
pub mod serializer;
pub mod xml;

pub use assembler::{validate, Assembler, GeneratedPart};
pub use binding::{placeholder_token, referenced_placeholders, MediaBinder, PLACEHOLDER_SCHEME};
pub use content_types::ContentTypes;
pub use docx::{DocxSerializer, DocxWriter};
pub use error::{OoxmlError, Result};
pub use package::{Package, CONTENT_TYPES_PART};
pub use relationships::{Relationship, Relationships};
pub use serializer::{FormatSerializer, SerializedPart};
pub use xml::escape_xml;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # mdoffice
//!
//! Markdown to Office Open XML: word-processing documents (`.docx`) and
//! slide decks (`.pptx`), with fenced diagrams rendered by a remote
//! service and embedded as images.
//!
//! ## Example
//!
//! ```
//! use mdoffice::{DeckOptions, Engine, EngineConfig};
//!
//! let engine = Engine::offline(EngineConfig::default());
//!
//! let docx = engine.render_docx("# Report\n\nAll systems nominal.", "report.docx").unwrap();
//! assert!(docx.starts_with(b"PK"));
//!
//! let pptx = engine
//!     .render_pptx("# Kickoff\n\n## Agenda\n- Scope", "kickoff.pptx", &DeckOptions::new())
//!     .unwrap();
//! assert!(pptx.starts_with(b"PK"));
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{DeckSettings, DocxSettings, EngineConfig, TemplateSettings};
pub use engine::{CancelToken, DeckOptions, Engine, TemplateSelector};
pub use error::{EngineError, Result};

pub use mdoffice_diagrams::{DiagramRenderer, RendererConfig};
pub use mdoffice_model::{Block, ElementDocument, ImageSet, Outline, Run, SlideContent, SlideLayout};
pub use mdoffice_pptx::DeckStyle;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # mdoffice-core
//!
//! Front ends of the mdoffice pipelines:
//!
//! - [`projector`]: Markdown to [`ElementDocument`](mdoffice_model::ElementDocument)
//!   for word-processing output, rendering fenced diagrams on the way
//! - [`outline`]: Markdown to [`Outline`](mdoffice_model::Outline) for slide decks
//!
//! # Example
//!
//! ```
//! use mdoffice_core::{parse_outline, Projector};
//! use mdoffice_model::{Block, SlideLayout};
//!
//! let projection = Projector::new().project("# Hello\n\nWorld");
//! assert!(matches!(projection.document.blocks[0], Block::Heading { level: 1, .. }));
//!
//! let outline = parse_outline("# Deck\n## Agenda\n- one\n- two");
//! assert_eq!(outline.slides[1].layout, SlideLayout::Content);
//! ```

pub mod error;
pub mod html;
pub mod inline;
pub mod outline;
pub mod pipe_table;
pub mod projector;

pub use error::{decode_utf8, CoreError, Result};
pub use inline::{parse_runs, strip_markup};
pub use outline::{parse_outline, render_outline_diagrams};
pub use projector::{project, Projection, Projector};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

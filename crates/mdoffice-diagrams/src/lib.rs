//! # mdoffice-diagrams
//!
//! Diagram rendering for mdoffice. Fenced diagram blocks are sent to a
//! remote rendering service and come back as raster image bytes.
//!
//! ## Example
//!
//! ```no_run
//! use mdoffice_diagrams::{DiagramRenderer, RemoteRenderer, RendererConfig};
//!
//! let renderer = RemoteRenderer::new(&RendererConfig::default())?;
//! let png = renderer.render("graph TD; A-->B;")?;
//! # Ok::<(), mdoffice_diagrams::RenderError>(())
//! ```

pub mod error;
pub mod remote;
pub mod renderer;

pub use error::{RenderError, Result};
pub use remote::{
    encode_source, RemoteRenderer, RendererConfig, DEFAULT_FALLBACK_BASE, DEFAULT_PRIMARY_URL,
    DEFAULT_TIMEOUT_SECS,
};
pub use renderer::{is_diagram_language, DiagramRenderer, NoopRenderer, DIAGRAM_LANGUAGES};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Diagram renderer trait
//!
//! Renderers turn diagram source into raster image bytes. Callers treat a
//! failure as non-fatal and keep the source unrendered.

use crate::error::{RenderError, Result};

/// Fenced-block languages rendered as diagrams
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "mmd"];

/// Check whether a fenced block info string names a diagram language
///
/// Only the first whitespace-separated token is considered, case-insensitively.
pub fn is_diagram_language(info: &str) -> bool {
    info.split_whitespace()
        .next()
        .map(|lang| {
            DIAGRAM_LANGUAGES
                .iter()
                .any(|known| lang.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Trait for diagram renderers
///
/// Renderers must be `Send + Sync` so one engine can serve concurrent
/// conversions.
pub trait DiagramRenderer: Send + Sync {
    /// Human-readable name of this renderer
    fn name(&self) -> &'static str;

    /// Render diagram source to image bytes
    fn render(&self, code: &str) -> Result<Vec<u8>>;
}

/// Renderer used when diagrams are disabled; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl DiagramRenderer for NoopRenderer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn render(&self, _code: &str) -> Result<Vec<u8>> {
        Err(RenderError::Disabled)
    }
}

impl<R: DiagramRenderer + ?Sized> DiagramRenderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, code: &str) -> Result<Vec<u8>> {
        (**self).render(code)
    }
}

impl<R: DiagramRenderer + ?Sized> DiagramRenderer for std::sync::Arc<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, code: &str) -> Result<Vec<u8>> {
        (**self).render(code)
    }
}

//! Error type of the conversion engine

use mdoffice_core::CoreError;
use mdoffice_diagrams::RenderError;
use mdoffice_ooxml::OoxmlError;
use mdoffice_pptx::PptxError;
use thiserror::Error;

/// Errors returned by [`Engine`](crate::Engine) operations
///
/// Diagram failures during a conversion are not errors; only a renderer
/// that cannot be set up surfaces as [`EngineError::Render`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    #[error(transparent)]
    Pptx(#[from] PptxError),

    #[error("Diagram renderer setup failed: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A named template matched no file in the template directory
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("Conversion cancelled")]
    Cancelled,
}

impl EngineError {
    /// Short diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Core(_) => "ENGINE001",
            EngineError::Ooxml(_) => "ENGINE002",
            EngineError::Pptx(e) => e.code(),
            EngineError::Render(_) => "ENGINE003",
            EngineError::Io(_) => "ENGINE004",
            EngineError::Config(_) => "ENGINE005",
            EngineError::UnknownTemplate(_) => "ENGINE006",
            EngineError::Cancelled => "ENGINE007",
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

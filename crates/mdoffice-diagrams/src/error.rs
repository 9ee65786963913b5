//! Error types for diagram rendering

use thiserror::Error;

/// Errors that can occur while rendering a diagram
///
/// Every variant names the endpoint involved; response bodies are never
/// carried.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The request could not be sent or the response not read
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The endpoint answered successfully but without image bytes
    #[error("{endpoint} returned an empty body")]
    EmptyBody { endpoint: String },

    /// Both the primary and the fallback endpoint failed
    #[error("diagram rendering failed (primary: {primary}; fallback: {fallback})")]
    AllEndpointsFailed {
        primary: Box<RenderError>,
        fallback: Box<RenderError>,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// Rendering is switched off
    #[error("diagram rendering is disabled")]
    Disabled,
}

impl RenderError {
    /// HTTP status of the failure, when the endpoint answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RenderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for diagram rendering
pub type Result<T> = std::result::Result<T, RenderError>;

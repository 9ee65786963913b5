//! Error types for Markdown input handling

use thiserror::Error;

/// Errors raised before projection starts
#[derive(Error, Debug)]
pub enum CoreError {
    /// The input bytes are not valid UTF-8
    #[error("Markdown input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// Reading the input stream failed
    #[error("Failed to read Markdown input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Decode Markdown bytes, rejecting invalid UTF-8
pub fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| CoreError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

//! Detection sub-task errors raised inside the page context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Document unavailable: {0}")]
    DocumentUnavailable(String),

    #[error("Probe failed for {path}: {message}")]
    Probe { path: String, message: String },

    #[error("{0}")]
    Custom(String),
}

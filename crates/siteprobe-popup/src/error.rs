//! Popup errors.

use siteprobe_protocols::{ChannelError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopupError {
    /// The runtime message port failed.
    #[error("Transport error: {0}")]
    Transport(#[from] ChannelError),

    /// The coordinator answered with `{error, kind}`.
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("Unexpected response to {action}")]
    UnexpectedResponse { action: &'static str },

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PopupError {
    pub fn rejected(kind: ErrorKind, message: impl Into<String>) -> Self {
        PopupError::Rejected {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            PopupError::Transport(e) => e.is_timeout(),
            PopupError::Rejected { kind, .. } => *kind == ErrorKind::Timeout,
            _ => false,
        }
    }
}

//! Browser host errors.

use siteprobe_protocols::TabId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("No tab with id: {0}")]
    TabNotFound(TabId),

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HostError {
    pub(crate) fn invalid_url(url: &str, e: url::ParseError) -> Self {
        HostError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

//! Cross-context transport errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Message timeout after {0:?}")]
    Timeout(Duration),

    #[error("Could not establish connection: receiving end does not exist")]
    NoReceiver,

    #[error("Message port closed before a response was received")]
    Closed,
}

impl ChannelError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChannelError::Timeout(_))
    }
}

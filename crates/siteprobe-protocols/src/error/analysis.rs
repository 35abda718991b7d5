//! Orchestration error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::channel::ChannelError;
use super::injection::InjectionError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Privileged page; fatal, never retried.
    #[error("This page cannot be analyzed (browser-internal page): {0}")]
    NotAnalyzable(String),

    /// Channel unreachable or timed out.
    #[error("Transport error: {0}")]
    Transport(#[from] ChannelError),

    /// The page analyzer answered with `success: false`.
    #[error("Page analysis failed: {0}")]
    DelegatedFailure(String),

    /// Active tab could not be resolved.
    #[error("Could not resolve active tab: {0}")]
    Resolution(String),

    #[error("Injection failed: {0}")]
    Injection(#[from] InjectionError),

    /// Every fallback tier failed.
    #[error("Analysis failed completely: {0}")]
    Exhausted(String),
}

impl AnalysisError {
    /// Whether the error is surfaced without attempting any fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::NotAnalyzable(_) | AnalysisError::Exhausted(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalysisError::Transport(e) if e.is_timeout())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::NotAnalyzable(_) => ErrorKind::NotAnalyzable,
            AnalysisError::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            AnalysisError::Transport(_) => ErrorKind::Transport,
            AnalysisError::DelegatedFailure(_) => ErrorKind::DelegatedFailure,
            AnalysisError::Resolution(_) => ErrorKind::Resolution,
            AnalysisError::Injection(_) => ErrorKind::Injection,
            AnalysisError::Exhausted(_) => ErrorKind::Exhausted,
        }
    }
}

/// Kind of a failure reported across the runtime channel.
///
/// Errors that did not come from an [`AnalysisError`] are `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotAnalyzable,
    Timeout,
    Transport,
    DelegatedFailure,
    Resolution,
    Injection,
    Exhausted,
    #[default]
    Other,
}

//! Mapping of analysis failures to what the user sees.

use std::fmt;

use siteprobe_protocols::ErrorKind;

use crate::error::PopupError;

/// A failure message shown in place of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMessage {
    NotAnalyzable,
    ComponentsUnavailable,
    QuickAnalysisFailed,
    Failed,
}

impl UserMessage {
    pub fn text(&self) -> &'static str {
        match self {
            UserMessage::NotAnalyzable => {
                "This page cannot be analyzed. Navigate to a regular website."
            }
            UserMessage::ComponentsUnavailable => {
                "Extension components could not be loaded. Reload the page."
            }
            UserMessage::QuickAnalysisFailed => "Quick analysis failed too. Reload the page.",
            UserMessage::Failed => "Analysis failed.",
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// What the controller does about a failed analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureResponse {
    /// Compute a quick analysis locally instead of showing an error.
    QuickAnalysis,
    Show(UserMessage),
}

pub fn classify_failure(error: &PopupError) -> FailureResponse {
    if error.is_timeout() {
        return FailureResponse::QuickAnalysis;
    }
    let message = match error {
        PopupError::Transport(_) => UserMessage::ComponentsUnavailable,
        PopupError::Rejected { kind, .. } => match kind {
            ErrorKind::NotAnalyzable => UserMessage::NotAnalyzable,
            ErrorKind::Transport => UserMessage::ComponentsUnavailable,
            _ => UserMessage::Failed,
        },
        _ => UserMessage::Failed,
    };
    FailureResponse::Show(message)
}

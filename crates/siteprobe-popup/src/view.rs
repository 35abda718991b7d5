//! Rendering surface of the popup.

use siteprobe_protocols::AnalysisRecord;

use crate::classify::UserMessage;

/// Where the controller sends what the user should see.
///
/// Calls arrive from the controller's tasks; implementations must not block.
pub trait View: Send + Sync {
    /// A cycle started.
    fn loading(&self);

    /// Progress tick; `percent` never reaches 100 before a result.
    fn progress(&self, percent: u8, status: &str);

    fn render(&self, record: &AnalysisRecord);

    fn error(&self, message: UserMessage);

    /// Back to the idle state after a cancel.
    fn idle(&self);
}

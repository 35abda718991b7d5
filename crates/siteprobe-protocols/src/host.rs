//! Browser capabilities available to the background coordinator.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AnalysisError, ChannelError, InjectionError};
use crate::message::{PageRequest, PageResponse};
use crate::script::ScriptModule;
use crate::types::{TabId, TabInfo};

/// Tab resolution, tab messaging and script injection.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Resolve the active tab of the current window.
    ///
    /// Fails with [`AnalysisError::Resolution`] when no tab is active or its
    /// URL cannot be parsed.
    async fn active_tab(&self) -> Result<TabInfo, AnalysisError>;

    /// Send a request to the page context of `tab`, waiting at most `timeout`.
    async fn send_to_tab(
        &self,
        tab: TabId,
        request: PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, ChannelError>;

    /// Load one script module into the page context of `tab`.
    async fn inject_script(&self, tab: TabId, module: ScriptModule) -> Result<(), InjectionError>;
}

//! [`TabHost`] over the in-process browser.

use std::time::Duration;

use async_trait::async_trait;
use siteprobe_protocols::domain::is_privileged_url;
use siteprobe_protocols::{
    AnalysisError, ChannelError, InjectionError, PageRequest, PageResponse, ScriptModule, TabHost,
    TabId, TabInfo,
};
use tracing::debug;

use crate::browser::Browser;

#[async_trait]
impl TabHost for Browser {
    async fn active_tab(&self) -> Result<TabInfo, AnalysisError> {
        let id = (*self.active.read().await)
            .ok_or_else(|| AnalysisError::Resolution("no active tab".to_string()))?;
        let tabs = self.tabs.read().await;
        let state = tabs
            .get(&id)
            .ok_or_else(|| AnalysisError::Resolution(format!("tab {} is gone", id)))?;
        TabInfo::from_url(id, &state.url, state.title.clone())
            .map_err(|e| AnalysisError::Resolution(format!("{}: {}", state.url, e)))
    }

    async fn send_to_tab(
        &self,
        tab: TabId,
        request: PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, ChannelError> {
        let port = match self.page(tab).await {
            Ok(Some(page)) => page.port(),
            _ => None,
        };
        let Some(port) = port else {
            debug!("Tab {} has no analyzer listening", tab);
            return Err(ChannelError::NoReceiver);
        };
        port.request(request, timeout).await
    }

    async fn inject_script(&self, tab: TabId, module: ScriptModule) -> Result<(), InjectionError> {
        let (url, page) = {
            let tabs = self.tabs.read().await;
            let state = tabs.get(&tab).ok_or(InjectionError::TabNotFound(tab))?;
            (state.url.clone(), state.page.clone())
        };
        if is_privileged_url(&url) {
            return Err(InjectionError::Restricted(url));
        }
        let page =
            page.ok_or_else(|| InjectionError::Failed(format!("{} has no document", url)))?;
        page.inject(module, &self.env)
    }
}

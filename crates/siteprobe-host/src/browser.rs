//! Browser tab manager.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use siteprobe_analyzer::HtmlDocument;
use siteprobe_channel::Endpoint;
use siteprobe_config::{AnalyzerConfig, HostConfig};
use siteprobe_protocols::domain::is_privileged_url;
use siteprobe_protocols::{
    INJECTION_ORDER, PageDocument, ReachabilityProber, RuntimeRequest, RuntimeResponse,
    ScriptModule, TabEvent, TabHost, TabId, TabStatus,
};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::HostError;
use crate::loader::DocumentLoader;
use crate::page::{AnalyzerEnv, PageContext};

const EVENT_CAPACITY: usize = 64;

pub(crate) struct TabState {
    pub url: String,
    pub title: String,
    /// `None` for privileged pages and failed loads.
    pub page: Option<Arc<PageContext>>,
    pub load_error: Option<String>,
}

impl TabState {
    fn blank(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: url.to_string(),
            page: None,
            load_error: None,
        }
    }
}

/// A single-window browser whose tabs host SiteProbe page contexts.
pub struct Browser {
    config: HostConfig,
    pub(crate) env: AnalyzerEnv,
    loader: Arc<dyn DocumentLoader>,
    pub(crate) tabs: RwLock<HashMap<TabId, TabState>>,
    pub(crate) active: RwLock<Option<TabId>>,
    next_tab: AtomicU32,
    events: broadcast::Sender<TabEvent>,
}

impl Browser {
    /// Create a browser. Analyzers loaded into its pages announce themselves
    /// on `runtime`.
    pub fn new(
        config: HostConfig,
        analyzer: AnalyzerConfig,
        loader: Arc<dyn DocumentLoader>,
        prober: Arc<dyn ReachabilityProber>,
        runtime: Endpoint<RuntimeRequest, RuntimeResponse>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            env: AnalyzerEnv {
                config: analyzer,
                prober,
                runtime,
            },
            loader,
            tabs: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            next_tab: AtomicU32::new(1),
            events,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Tab lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }

    /// Open `url` in a new tab and make it active.
    ///
    /// A document that fails to load leaves the tab open without a page
    /// context; see [`Browser::load_error`].
    pub async fn open_tab(&self, url: &str) -> Result<TabId, HostError> {
        Url::parse(url).map_err(|e| HostError::invalid_url(url, e))?;
        let id = self.next_tab.fetch_add(1, Ordering::Relaxed);
        self.tabs.write().await.insert(id, TabState::blank(url));
        *self.active.write().await = Some(id);
        info!("Opened tab {}", id);
        self.navigate(id, url).await?;
        Ok(id)
    }

    /// Load `url` into `tab`, replacing its page context.
    pub async fn navigate(&self, tab: TabId, url: &str) -> Result<(), HostError> {
        let parsed = Url::parse(url).map_err(|e| HostError::invalid_url(url, e))?;
        if !self.tabs.read().await.contains_key(&tab) {
            return Err(HostError::TabNotFound(tab));
        }
        self.emit(TabEvent::Updated {
            tab_id: tab,
            status: TabStatus::Loading,
            url: Some(url.to_string()),
        });

        let state = if is_privileged_url(url) {
            TabState::blank(url)
        } else {
            match self.loader.load(&parsed).await {
                Ok(loaded) => {
                    let document = HtmlDocument::parse(&loaded.html, &loaded.url);
                    let title = document.title();
                    let final_url = loaded.url.to_string();
                    TabState {
                        title: if title.is_empty() {
                            final_url.clone()
                        } else {
                            title
                        },
                        url: final_url,
                        page: Some(Arc::new(PageContext::new(tab, document, loaded.url))),
                        load_error: None,
                    }
                }
                Err(e) => {
                    warn!("Tab {} failed to load {}: {}", tab, url, e);
                    TabState {
                        load_error: Some(e.to_string()),
                        ..TabState::blank(url)
                    }
                }
            }
        };

        let final_url = state.url.clone();
        let has_page = state.page.is_some();
        {
            let mut tabs = self.tabs.write().await;
            let Some(slot) = tabs.get_mut(&tab) else {
                return Err(HostError::TabNotFound(tab));
            };
            *slot = state;
        }
        debug!("Tab {} is now at {}", tab, final_url);
        self.emit(TabEvent::Updated {
            tab_id: tab,
            status: TabStatus::Complete,
            url: Some(final_url),
        });

        if self.config.auto_inject && has_page {
            self.inject_declared(tab).await;
        }
        Ok(())
    }

    /// History API navigation: the document stays, only its URL changes.
    pub async fn push_state(&self, tab: TabId, url: &str) -> Result<(), HostError> {
        let parsed = Url::parse(url).map_err(|e| HostError::invalid_url(url, e))?;
        let mut tabs = self.tabs.write().await;
        let state = tabs.get_mut(&tab).ok_or(HostError::TabNotFound(tab))?;
        state.url = parsed.to_string();
        if let Some(page) = &state.page {
            page.set_location(parsed);
        }
        Ok(())
    }

    pub async fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        let removed = self.tabs.write().await.remove(&tab);
        if removed.is_none() {
            return Err(HostError::TabNotFound(tab));
        }
        let fallback = self.tabs.read().await.keys().min().copied();
        {
            let mut active = self.active.write().await;
            if *active == Some(tab) {
                *active = fallback;
            }
        }
        info!("Closed tab {}", tab);
        self.emit(TabEvent::Removed { tab_id: tab });
        Ok(())
    }

    pub async fn activate(&self, tab: TabId) -> Result<(), HostError> {
        if !self.tabs.read().await.contains_key(&tab) {
            return Err(HostError::TabNotFound(tab));
        }
        *self.active.write().await = Some(tab);
        Ok(())
    }

    pub async fn active_tab_id(&self) -> Option<TabId> {
        *self.active.read().await
    }

    pub async fn tab_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self.tabs.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Why the tab's document failed to load, if it did.
    pub async fn load_error(&self, tab: TabId) -> Option<String> {
        self.tabs
            .read()
            .await
            .get(&tab)
            .and_then(|state| state.load_error.clone())
    }

    /// Record a request issued by the page after load.
    pub async fn record_request(&self, tab: TabId, url: &str) -> Result<(), HostError> {
        let page = self.page(tab).await?;
        if let Some(page) = page {
            page.record_request(url);
        }
        Ok(())
    }

    /// Modules currently loaded into the tab's page context.
    pub async fn loaded_modules(&self, tab: TabId) -> Vec<ScriptModule> {
        match self.page(tab).await {
            Ok(Some(page)) => page.loaded_modules(),
            _ => Vec::new(),
        }
    }

    pub(crate) async fn page(&self, tab: TabId) -> Result<Option<Arc<PageContext>>, HostError> {
        self.tabs
            .read()
            .await
            .get(&tab)
            .map(|state| state.page.clone())
            .ok_or(HostError::TabNotFound(tab))
    }

    /// Load every module the way declared content scripts run on page load.
    async fn inject_declared(&self, tab: TabId) {
        for module in INJECTION_ORDER {
            if let Err(e) = self.inject_script(tab, module).await {
                warn!("Declared content script {} failed in tab {}: {}", module, tab, e);
                return;
            }
        }
    }

    fn emit(&self, event: TabEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;

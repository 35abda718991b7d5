//! Tab lifecycle hooks.

use std::sync::Arc;

use siteprobe_protocols::{TabEvent, TabId, TabStatus};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use url::Url;

use crate::coordinator::Coordinator;

impl Coordinator {
    pub fn on_tab_removed(&self, tab: TabId) {
        self.readiness.clear(tab);
        debug!("Tab {} removed", tab);
    }

    /// A completed navigation resets readiness for the tab and drops the
    /// cache entry of the domain the tab navigated *to*.
    pub fn on_tab_updated(&self, tab: TabId, status: TabStatus, url: Option<&str>) {
        if status != TabStatus::Complete {
            return;
        }
        let Some(url) = url else { return };

        self.readiness.clear(tab);
        match Url::parse(url) {
            Ok(parsed) => {
                let domain = parsed.host_str().unwrap_or_default();
                if self.cache.invalidate(domain) {
                    info!("Tab {} updated, cache cleared for {}", tab, domain);
                }
            }
            Err(e) => warn!("Failed to process tab update for {}: {}", url, e),
        }
    }

    pub fn on_tab_event(&self, event: TabEvent) {
        match event {
            TabEvent::Updated {
                tab_id,
                status,
                url,
            } => self.on_tab_updated(tab_id, status, url.as_deref()),
            TabEvent::Removed { tab_id } => self.on_tab_removed(tab_id),
        }
    }

    /// Apply tab events until the host stops publishing them.
    pub async fn watch_tabs(self: Arc<Self>, mut events: broadcast::Receiver<TabEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.on_tab_event(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Tab event watcher lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Tab event stream closed");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

//! Page analyzer readiness detection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use siteprobe_protocols::{PageRequest, TabHost, TabId};
use tracing::debug;

/// Ping-based readiness check plus the per-tab readiness hint map.
///
/// The hint is set by analyzer announcements and successful pings; it is
/// never trusted on its own. [`check`](Self::check) always pings.
pub struct ReadinessChannel {
    host: Arc<dyn TabHost>,
    timeout: Duration,
    hints: Mutex<HashMap<TabId, bool>>,
}

impl ReadinessChannel {
    pub fn new(host: Arc<dyn TabHost>, timeout: Duration) -> Self {
        Self {
            host,
            timeout,
            hints: Mutex::new(HashMap::new()),
        }
    }

    /// Ping the page analyzer of `tab`.
    ///
    /// Any failure (timeout, no receiver, unexpected reply) means not ready.
    pub async fn check(&self, tab: TabId) -> bool {
        let ready = match self.host.send_to_tab(tab, PageRequest::Ping, self.timeout).await {
            Ok(response) => response.is_ready(),
            Err(e) => {
                debug!("Content script not ready in tab {}: {}", tab, e);
                false
            }
        };

        if ready {
            self.mark(tab);
        } else {
            self.clear(tab);
        }
        ready
    }

    /// Record an analyzer announcement for `tab`.
    pub fn mark(&self, tab: TabId) {
        self.hints.lock().insert(tab, true);
    }

    pub fn clear(&self, tab: TabId) {
        self.hints.lock().remove(&tab);
    }

    /// Whether `tab` was last seen with a loaded analyzer.
    pub fn hint(&self, tab: TabId) -> bool {
        self.hints.lock().get(&tab).copied().unwrap_or(false)
    }

    pub fn hinted_tabs(&self) -> usize {
        self.hints.lock().len()
    }
}

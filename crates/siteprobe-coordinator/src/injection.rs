//! On-demand page analyzer injection.

use std::sync::Arc;
use std::time::Duration;

use siteprobe_protocols::{INJECTION_ORDER, InjectionError, TabHost, TabId};
use tracing::{debug, info, warn};

/// Loads the analyzer modules into a page context and waits for them to
/// settle.
pub struct InjectionController {
    host: Arc<dyn TabHost>,
    settle_delay: Duration,
}

impl InjectionController {
    pub fn new(host: Arc<dyn TabHost>, settle_delay: Duration) -> Self {
        Self { host, settle_delay }
    }

    /// Inject helpers first, then the analyzer.
    ///
    /// Stops at the first failing module; nothing is retried here.
    pub async fn inject(&self, tab: TabId) -> Result<(), InjectionError> {
        info!("Injecting content scripts into tab {}", tab);

        for module in INJECTION_ORDER {
            if let Err(e) = self.host.inject_script(tab, module).await {
                warn!("Failed to inject {} into tab {}: {}", module, tab, e);
                return Err(e);
            }
            debug!("Injected {} into tab {}", module, tab);
        }

        tokio::time::sleep(self.settle_delay).await;
        debug!("Content scripts settled in tab {}", tab);
        Ok(())
    }
}

//! The background coordinator service.

use std::sync::Arc;

use parking_lot::Mutex;
use siteprobe_config::CoordinatorConfig;
use siteprobe_protocols::{AnalysisRecord, CacheEntry, TabHost};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cache::AnalysisCache;
use crate::injection::InjectionController;
use crate::readiness::ReadinessChannel;
use crate::store::AnalysisStore;

/// Owns the readiness map, the analysis cache and the orchestration policy.
///
/// Shared behind an `Arc` by the runtime message handler and the tab event
/// watcher. State is guarded by short `parking_lot` locks that are never held
/// across an await.
pub struct Coordinator {
    pub(crate) host: Arc<dyn TabHost>,
    pub(crate) config: CoordinatorConfig,
    pub(crate) readiness: ReadinessChannel,
    pub(crate) injection: InjectionController,
    pub(crate) cache: AnalysisCache,
    store: Option<Arc<dyn AnalysisStore>>,
    writes: Mutex<JoinSet<()>>,
}

impl Coordinator {
    pub fn new(host: Arc<dyn TabHost>, config: CoordinatorConfig) -> Self {
        Self {
            readiness: ReadinessChannel::new(host.clone(), config.ping_timeout()),
            injection: InjectionController::new(host.clone(), config.settle_delay()),
            cache: AnalysisCache::new(config.cache_ttl()),
            host,
            config,
            store: None,
            writes: Mutex::new(JoinSet::new()),
        }
    }

    /// Persist every successful analysis to `store`.
    pub fn with_store(mut self, store: Arc<dyn AnalysisStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn readiness(&self) -> &ReadinessChannel {
        &self.readiness
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Cache `record` and persist it in the background.
    pub(crate) fn store_record(&self, record: AnalysisRecord) -> CacheEntry {
        let entry = self.cache.insert(record);
        if entry.record.domain.is_empty() {
            return entry;
        }

        if let Some(store) = self.store.clone() {
            let persisted = entry.clone();
            let mut writes = self.writes.lock();
            while writes.try_join_next().is_some() {}
            writes.spawn(async move {
                let key = persisted.storage_key();
                match store.put(&key, &persisted).await {
                    Ok(()) => info!("Analysis persisted as {}", key),
                    Err(e) => warn!("Failed to persist analysis {}: {}", key, e),
                }
            });
        }
        entry
    }

    /// Wait for the store writes started so far.
    pub async fn flush(&self) {
        let mut writes = std::mem::take(&mut *self.writes.lock());
        while writes.join_next().await.is_some() {}
    }
}

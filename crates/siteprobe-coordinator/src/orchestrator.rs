//! Tiered analysis of the active tab.
//!
//! ```text
//! Idle -> CacheCheck -> DelegatedAttempt(n) -> Success ------------> Cached
//!                               |                                    ^
//!                               +-> LocalFallback (basic) -----------+
//!   any failure except NotAnalyzable -> MinimalFallback (minimal) ---+
//! ```

use siteprobe_protocols::domain::is_privileged_url;
use siteprobe_protocols::{
    AnalysisError, AnalysisRecord, CacheEntry, PageRequest, PageResponse, TabInfo,
};
use tracing::{debug, error, info, warn};

use crate::coordinator::Coordinator;
use crate::fallback;

impl Coordinator {
    /// Analyze the active tab, degrading through the fallback tiers.
    ///
    /// Only two outcomes are errors: a browser-internal page
    /// ([`AnalysisError::NotAnalyzable`], returned before any injection) and
    /// a tab that cannot be resolved even for the minimal tier
    /// ([`AnalysisError::Exhausted`]).
    pub async fn analyze_current_tab(&self) -> Result<CacheEntry, AnalysisError> {
        match self.run_pipeline().await {
            Ok(entry) => Ok(entry),
            Err(e @ AnalysisError::NotAnalyzable(_)) => {
                info!("Refusing to analyze: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!("Analysis pipeline failed: {}; falling back to minimal analysis", e);
                self.minimal_fallback().await
            }
        }
    }

    async fn run_pipeline(&self) -> Result<CacheEntry, AnalysisError> {
        let tab = self.host.active_tab().await?;
        if is_privileged_url(&tab.url) {
            return Err(AnalysisError::NotAnalyzable(tab.url));
        }

        debug!("CacheCheck for {}", tab.domain);
        if let Some(entry) = self.cache.get(&tab.domain) {
            info!("Using recent cached analysis for {}", tab.domain);
            return Ok(entry);
        }

        let record = match self.delegated_analysis(&tab).await {
            Ok(record) => {
                info!("Content script analysis successful for {}", tab.domain);
                record
            }
            Err(e) => {
                warn!("Content script analysis failed: {}; using basic analysis", e);
                fallback::basic_analysis(&tab)
            }
        };

        if !record.success {
            return Err(AnalysisError::DelegatedFailure(format!(
                "{} analysis of {} was unsuccessful",
                record.analysis_type, record.domain
            )));
        }
        Ok(self.store_record(record))
    }

    /// Up to `max_attempts` delegated attempts with a pause in between.
    async fn delegated_analysis(&self, tab: &TabInfo) -> Result<AnalysisRecord, AnalysisError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(
                "DelegatedAttempt {}/{} for tab {}",
                attempt, max_attempts, tab.id
            );
            match self.delegated_attempt(tab, attempt).await {
                Ok(record) => return Ok(record),
                Err(e @ AnalysisError::Injection(_)) => return Err(e),
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                debug!("Retrying in {:?}", self.config.retry_delay());
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| AnalysisError::DelegatedFailure("no attempt made".to_string())))
    }

    async fn delegated_attempt(
        &self,
        tab: &TabInfo,
        attempt: u32,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let ready = self.readiness.check(tab.id).await;
        if !ready && attempt == 1 {
            self.injection.inject(tab.id).await?;
        }

        let response = self
            .host
            .send_to_tab(
                tab.id,
                PageRequest::PerformAnalysis,
                self.config.analysis_timeout(),
            )
            .await?;

        match response {
            PageResponse::Analysis {
                success: true,
                data: Some(record),
                ..
            } => Ok(*record),
            PageResponse::Analysis { error, .. } => Err(AnalysisError::DelegatedFailure(
                error.unwrap_or_else(|| "Content script response invalid".to_string()),
            )),
            PageResponse::Status { status } => Err(AnalysisError::DelegatedFailure(format!(
                "unexpected status response: {}",
                status
            ))),
        }
    }

    async fn minimal_fallback(&self) -> Result<CacheEntry, AnalysisError> {
        match self.host.active_tab().await {
            Ok(tab) => {
                info!("Performing minimal analysis for {}", tab.domain);
                Ok(self.store_record(fallback::minimal_analysis(&tab)))
            }
            Err(e) => {
                error!("Analysis failed completely: {}", e);
                Err(AnalysisError::Exhausted(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

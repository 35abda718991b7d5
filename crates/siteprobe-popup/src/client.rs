//! Access to the background coordinator.

use std::time::Duration;

use async_trait::async_trait;
use siteprobe_channel::Endpoint;
use siteprobe_protocols::{CacheEntry, RuntimeRequest, RuntimeResponse, TabInfo};
use tracing::debug;

use crate::error::PopupError;

/// Runtime requests the popup issues.
#[async_trait]
pub trait CoordinatorClient: Send + Sync {
    async fn tab_info(&self) -> Result<TabInfo, PopupError>;

    /// Cached analysis of `domain`, if the coordinator has a fresh one.
    async fn cached_analysis(&self, domain: &str) -> Result<Option<CacheEntry>, PopupError>;

    async fn analyze_current_tab(&self) -> Result<CacheEntry, PopupError>;
}

/// Upper bound on one runtime round trip; the UI timeout is usually shorter.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`CoordinatorClient`] over a runtime message port.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    endpoint: Endpoint<RuntimeRequest, RuntimeResponse>,
    timeout: Duration,
}

impl RuntimeClient {
    pub fn new(endpoint: Endpoint<RuntimeRequest, RuntimeResponse>) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: RuntimeRequest) -> Result<RuntimeResponse, PopupError> {
        let action = request.action();
        debug!("Popup sending {}", action);
        match self.endpoint.request(request, self.timeout).await? {
            RuntimeResponse::Error { error, kind } => Err(PopupError::rejected(kind, error)),
            response => Ok(response),
        }
    }
}

#[async_trait]
impl CoordinatorClient for RuntimeClient {
    async fn tab_info(&self) -> Result<TabInfo, PopupError> {
        match self.send(RuntimeRequest::GetTabInfo).await? {
            RuntimeResponse::TabInfo(tab) => Ok(tab),
            _ => Err(PopupError::UnexpectedResponse {
                action: "getTabInfo",
            }),
        }
    }

    async fn cached_analysis(&self, domain: &str) -> Result<Option<CacheEntry>, PopupError> {
        let request = RuntimeRequest::GetAnalysisData {
            domain: domain.to_string(),
        };
        match self.send(request).await? {
            RuntimeResponse::Analysis(entry) => Ok(entry.map(|e| *e)),
            _ => Err(PopupError::UnexpectedResponse {
                action: "getAnalysisData",
            }),
        }
    }

    async fn analyze_current_tab(&self) -> Result<CacheEntry, PopupError> {
        match self.send(RuntimeRequest::AnalyzeCurrentTab).await? {
            RuntimeResponse::Analysis(Some(entry)) if entry.record.success => Ok(*entry),
            _ => Err(PopupError::UnexpectedResponse {
                action: "analyzeCurrentTab",
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

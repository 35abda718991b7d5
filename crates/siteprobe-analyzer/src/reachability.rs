//! Same-origin reachability probes for sitemap and robots files.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use siteprobe_protocols::ReachabilityProber;
use siteprobe_protocols::error::DetectError;
use tracing::debug;
use url::Url;

/// Sitemap locations tried in order.
pub const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemap.txt"];

pub const ROBOTS_PATH: &str = "/robots.txt";

/// `HEAD` probes over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReachability {
    client: Client,
}

impl HttpReachability {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, DetectError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DetectError::Custom(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProber for HttpReachability {
    async fn probe(&self, origin: &Url, path: &str) -> Result<bool, DetectError> {
        let url = origin.join(path).map_err(|e| DetectError::Probe {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| DetectError::Probe {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        debug!("Probe {} -> {}", path, response.status());
        Ok(response.status().is_success())
    }
}

async fn probe_within(
    prober: &dyn ReachabilityProber,
    origin: &Url,
    path: &str,
    timeout: Duration,
) -> Result<bool, DetectError> {
    match tokio::time::timeout(timeout, prober.probe(origin, path)).await {
        Ok(result) => result,
        Err(_) => Err(DetectError::Probe {
            path: path.to_string(),
            message: format!("timed out after {:?}", timeout),
        }),
    }
}

/// Whether any sitemap location is reachable, falling back to robots.txt.
///
/// All candidates are probed at once, so the check finishes within one
/// `timeout`. Individual probe failures count as unreachable.
pub async fn check_sitemap(
    prober: &dyn ReachabilityProber,
    origin: &Url,
    timeout: Duration,
) -> Result<bool, DetectError> {
    let probes = SITEMAP_PATHS
        .iter()
        .copied()
        .chain([ROBOTS_PATH])
        .map(|path| async move {
            match probe_within(prober, origin, path, timeout).await {
                Ok(found) => found,
                Err(e) => {
                    debug!("Sitemap probe failed: {}", e);
                    false
                }
            }
        });
    Ok(join_all(probes).await.into_iter().any(|found| found))
}

/// Whether robots.txt is reachable.
pub async fn check_robots(
    prober: &dyn ReachabilityProber,
    origin: &Url,
    timeout: Duration,
) -> Result<bool, DetectError> {
    probe_within(prober, origin, ROBOTS_PATH, timeout).await
}

#[cfg(test)]
#[path = "reachability_tests.rs"]
mod tests;

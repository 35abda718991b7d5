//! Fetching the documents a tab displays.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::HostError;

/// A fetched document.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Location after redirects.
    pub url: Url,
    pub html: String,
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<LoadedPage, HostError>;
}

/// Loads documents over HTTP.
///
/// Error statuses still produce a document, the way a browser renders a
/// server's error page.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentLoader for HttpLoader {
    async fn load(&self, url: &Url) -> Result<LoadedPage, HostError> {
        let failed = |e: reqwest::Error| HostError::Load {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(url.clone()).send().await.map_err(failed)?;
        let status = response.status();
        if status.is_success() {
            debug!("Loaded {} ({})", url, status);
        } else {
            warn!("{} answered {}", url, status);
        }
        let final_url = response.url().clone();
        let html = response.text().await.map_err(failed)?;
        Ok(LoadedPage {
            url: final_url,
            html,
        })
    }
}

/// Serves documents from memory, keyed by exact URL.
#[derive(Debug, Clone, Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `html` for `url`. The key is normalized the way [`Url`] prints it.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        let key = Url::parse(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.pages.insert(key, html.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl DocumentLoader for StaticPages {
    async fn load(&self, url: &Url) -> Result<LoadedPage, HostError> {
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(LoadedPage {
                url: url.clone(),
                html: html.clone(),
            }),
            None => Err(HostError::Load {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

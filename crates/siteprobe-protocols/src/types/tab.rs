//! Tab identity and lifecycle events.

use serde::{Deserialize, Serialize};
use url::Url;

/// Browser tab identifier.
pub type TabId = u32;

/// Identity of a tab as resolved by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    pub domain: String,
    pub title: String,
    pub is_secure: bool,
    pub protocol: String,
}

impl TabInfo {
    /// Resolve tab identity from its raw URL and title.
    pub fn from_url(
        id: TabId,
        url: &str,
        title: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url)?;
        let protocol = format!("{}:", parsed.scheme());
        Ok(Self {
            id,
            url: url.to_string(),
            domain: parsed.host_str().unwrap_or_default().to_string(),
            title: title.into(),
            is_secure: protocol == "https:",
            protocol,
        })
    }
}

/// Loading status reported with tab updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Tab lifecycle notifications observed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TabEvent {
    Updated {
        tab_id: TabId,
        status: TabStatus,
        url: Option<String>,
    },
    Removed {
        tab_id: TabId,
    },
}

#[cfg(test)]
#[path = "tab_tests.rs"]
mod tests;

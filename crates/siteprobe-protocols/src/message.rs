//! Message contract between the coordinator, the page analyzer and the popup.
//!
//! Requests are tagged by `action`; responses are untagged JSON objects so the
//! wire shape matches the extension runtime messages one to one.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ErrorKind};
use crate::types::{AnalysisRecord, CacheEntry, TabInfo};

/// Requests handled by the background coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeRequest {
    GetTabInfo,
    GetAnalysisData {
        domain: String,
    },
    AnalyzeCurrentTab,
    AnalysisComplete {
        data: Box<AnalysisRecord>,
    },
    /// Sent once by a page analyzer on load; the sender tab is implicit.
    ContentScriptReady {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl RuntimeRequest {
    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            RuntimeRequest::GetTabInfo => "getTabInfo",
            RuntimeRequest::GetAnalysisData { .. } => "getAnalysisData",
            RuntimeRequest::AnalyzeCurrentTab => "analyzeCurrentTab",
            RuntimeRequest::AnalysisComplete { .. } => "analysisComplete",
            RuntimeRequest::ContentScriptReady { .. } => "contentScriptReady",
        }
    }
}

/// Responses produced by the background coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeResponse {
    TabInfo(TabInfo),
    /// A cached or freshly computed record; `null` when nothing is cached.
    Analysis(Option<Box<CacheEntry>>),
    Ack {
        success: bool,
    },
    Error {
        error: String,
        #[serde(default)]
        kind: ErrorKind,
    },
}

impl RuntimeResponse {
    pub fn ack() -> Self {
        RuntimeResponse::Ack { success: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RuntimeResponse::Error {
            error: message.into(),
            kind: ErrorKind::Other,
        }
    }

    /// Report a failed analysis with its kind.
    pub fn analysis_error(error: &AnalysisError) -> Self {
        RuntimeResponse::Error {
            error: error.to_string(),
            kind: error.kind(),
        }
    }

    pub fn analysis(entry: Option<CacheEntry>) -> Self {
        RuntimeResponse::Analysis(entry.map(Box::new))
    }
}

/// Requests sent by the coordinator to a page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    Ping,
    PerformAnalysis,
}

/// Responses produced by a page analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageResponse {
    Status {
        status: String,
    },
    Analysis {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Box<AnalysisRecord>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl PageResponse {
    pub fn ready() -> Self {
        PageResponse::Status {
            status: "ready".to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PageResponse::Status { status } if status == "ready")
    }

    pub fn success(record: AnalysisRecord) -> Self {
        PageResponse::Analysis {
            success: true,
            data: Some(Box::new(record)),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        PageResponse::Analysis {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

//! Analysis record and finding types.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tab::TabInfo;

/// Version placeholder for technologies whose presence is known but whose
/// version is not.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Which degradation tier produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Delegated analysis inside the page context.
    ContentScript,
    /// Coarse analysis from tab metadata, computed by the coordinator.
    Basic,
    /// Last-resort fixed-shape record.
    Minimal,
    /// Local analysis computed by the popup after its own timeout.
    Quick,
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisType::ContentScript => write!(f, "content_script"),
            AnalysisType::Basic => write!(f, "basic"),
            AnalysisType::Minimal => write!(f, "minimal"),
            AnalysisType::Quick => write!(f, "quick"),
        }
    }
}

/// Confidence of a technology finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Severity of a vulnerability finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// A detected technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyFinding {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub confidence: Confidence,
    pub evidence: String,
}

impl TechnologyFinding {
    /// Create a finding without version information.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        confidence: Confidence,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            version: None,
            confidence,
            evidence: evidence.into(),
        }
    }

    /// Attach a version, falling back to [`UNKNOWN_VERSION`].
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = Some(version.unwrap_or_else(|| UNKNOWN_VERSION.to_string()));
        self
    }

    /// Whether this finding has a concrete version.
    pub fn has_known_version(&self) -> bool {
        matches!(self.version.as_deref(), Some(v) if v != UNKNOWN_VERSION)
    }
}

/// Drop findings whose `(name, category)` was already seen; the first
/// occurrence wins and order is preserved.
pub fn dedup_technologies(technologies: Vec<TechnologyFinding>) -> Vec<TechnologyFinding> {
    let mut seen = HashSet::new();
    technologies
        .into_iter()
        .filter(|tech| seen.insert((tech.name.clone(), tech.category.clone())))
        .collect()
}

/// A heuristic security finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityFinding {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl VulnerabilityFinding {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            description: description.into(),
            recommendation: recommendation.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The finding reported for any page served over plain HTTP.
    pub fn insecure_connection() -> Self {
        Self::new(
            "Insecure Connection",
            Severity::High,
            "The site is served over HTTP; traffic is not encrypted",
            "Install a TLS certificate and serve the site over HTTPS",
        )
    }
}

/// Summary of one `<form>` on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFinding {
    pub index: usize,
    pub method: String,
    pub action: String,
    pub has_password_field: bool,
    pub has_file_upload: bool,
    pub is_secure: bool,
    pub input_count: usize,
}

/// Transport security of the page as seen from its own context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificates {
    pub protocol: String,
    pub secure_context: bool,
}

/// The single output type every analysis tier produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub is_secure: bool,
    pub protocol: String,
    #[serde(default)]
    pub technologies: Vec<TechnologyFinding>,
    #[serde(default)]
    pub subdomains: BTreeSet<String>,
    #[serde(default)]
    pub external_domains: BTreeSet<String>,
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilityFinding>,
    #[serde(default)]
    pub security_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub forms: Vec<FormFinding>,
    pub certificates: Certificates,
    #[serde(default)]
    pub sitemap_exists: bool,
    #[serde(default)]
    pub robots_exists: bool,
    pub success: bool,
    pub analysis_type: AnalysisType,
}

impl AnalysisRecord {
    /// An empty successful record for `tab`, stamped now.
    pub fn for_tab(tab: &TabInfo, analysis_type: AnalysisType) -> Self {
        Self {
            url: tab.url.clone(),
            domain: tab.domain.clone(),
            title: tab.title.clone(),
            timestamp: Utc::now(),
            is_secure: tab.is_secure,
            protocol: tab.protocol.clone(),
            technologies: Vec::new(),
            subdomains: BTreeSet::new(),
            external_domains: BTreeSet::new(),
            vulnerabilities: Vec::new(),
            security_headers: BTreeMap::new(),
            forms: Vec::new(),
            certificates: Certificates {
                protocol: tab.protocol.clone(),
                secure_context: tab.is_secure,
            },
            sitemap_exists: false,
            robots_exists: false,
            success: true,
            analysis_type,
        }
    }

    /// Enforce the technology uniqueness invariant.
    pub fn finalize(mut self) -> Self {
        self.technologies = dedup_technologies(std::mem::take(&mut self.technologies));
        self
    }

    pub fn has_technology(&self, name: &str) -> bool {
        self.technologies.iter().any(|t| t.name == name)
    }

    pub fn has_vulnerability(&self, kind: &str) -> bool {
        self.vulnerabilities.iter().any(|v| v.kind == kind)
    }
}

/// A cached record, keyed by domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(record: AnalysisRecord, cached_at: DateTime<Utc>) -> Self {
        Self { record, cached_at }
    }

    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        let age = now.signed_duration_since(self.cached_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }

    /// Durable storage key for this entry.
    pub fn storage_key(&self) -> String {
        storage_key(&self.record.domain)
    }
}

/// Durable storage key for the analysis of `domain`.
pub fn storage_key(domain: &str) -> String {
    format!("analysis_{}", domain)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

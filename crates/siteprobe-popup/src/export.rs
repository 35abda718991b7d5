//! JSON report export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteprobe_protocols::AnalysisRecord;
use tokio::fs;
use tracing::info;

use crate::error::PopupError;

pub const EXPORTED_BY: &str = "SiteProbe";

/// An analysis record as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedReport {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub exported_at: DateTime<Utc>,
    pub exported_by: String,
}

impl ExportedReport {
    pub fn new(record: AnalysisRecord, exported_at: DateTime<Utc>) -> Self {
        Self {
            record,
            exported_at,
            exported_by: EXPORTED_BY.to_string(),
        }
    }

    /// `security-analysis-<domain>-<unix millis>.json`
    pub fn file_name(&self) -> String {
        format!(
            "security-analysis-{}-{}.json",
            self.record.domain,
            self.exported_at.timestamp_millis()
        )
    }
}

/// Write `record` as a pretty-printed report into `dir`; returns the path.
pub async fn export_report(record: &AnalysisRecord, dir: &Path) -> Result<PathBuf, PopupError> {
    let report = ExportedReport::new(record.clone(), Utc::now());
    let content = serde_json::to_string_pretty(&report)
        .map_err(|e| PopupError::Serialization(e.to_string()))?;

    fs::create_dir_all(dir).await?;
    let path = dir.join(report.file_name());
    fs::write(&path, content).await?;

    info!("Exported report for {} to {:?}", record.domain, path);
    Ok(path)
}

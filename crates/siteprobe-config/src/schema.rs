//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub popup: PopupConfig,

    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub host: HostConfig,
}

/// Background coordinator timing and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Readiness ping timeout.
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    /// Timeout of one delegated `performAnalysis` request.
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,

    /// Wait after injection before the first analysis request.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Wait between delegated attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Freshness window of cached analyses.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: default_ping_timeout_ms(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: default_max_attempts(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl CoordinatorConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_ping_timeout_ms() -> u64 {
    1000
}

fn default_analysis_timeout_ms() -> u64 {
    3000
}

fn default_settle_delay_ms() -> u64 {
    800
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    2
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Popup presentation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupConfig {
    /// Client-side timeout after which the popup computes a quick analysis.
    #[serde(default = "default_ui_timeout_ms")]
    pub ui_timeout_ms: u64,

    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    /// Progress never exceeds this value before a result arrives.
    #[serde(default = "default_progress_cap")]
    pub progress_cap: u8,

    #[serde(default = "default_slow_notice_after_ms")]
    pub slow_notice_after_ms: u64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            ui_timeout_ms: default_ui_timeout_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            progress_step: default_progress_step(),
            progress_cap: default_progress_cap(),
            slow_notice_after_ms: default_slow_notice_after_ms(),
        }
    }
}

impl PopupConfig {
    pub fn ui_timeout(&self) -> Duration {
        Duration::from_millis(self.ui_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn slow_notice_after(&self) -> Duration {
        Duration::from_millis(self.slow_notice_after_ms)
    }
}

fn default_ui_timeout_ms() -> u64 {
    5000
}

fn default_progress_interval_ms() -> u64 {
    100
}

fn default_progress_step() -> u8 {
    2
}

fn default_progress_cap() -> u8 {
    90
}

fn default_slow_notice_after_ms() -> u64 {
    4000
}

/// Page analyzer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Timeout of one sitemap/robots reachability probe.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Inline scripts above this count are reported.
    #[serde(default = "default_inline_script_threshold")]
    pub inline_script_threshold: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            inline_script_threshold: default_inline_script_threshold(),
        }
    }
}

impl AnalyzerConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_inline_script_threshold() -> usize {
    5
}

/// Durable analysis store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,

    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_storage_enabled(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_enabled() -> bool {
    true
}

fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".siteprobe").join("analysis"))
        .unwrap_or_else(|| PathBuf::from("/tmp/siteprobe/analysis"))
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// In-process browser host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Load the analyzer as a declared content script on every page load.
    #[serde(default)]
    pub auto_inject: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for fetching the inspected document.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            auto_inject: false,
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl HostConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_user_agent() -> String {
    "SiteProbe/0.1".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

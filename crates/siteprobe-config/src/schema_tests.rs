use super::*;

#[test]
fn test_coordinator_defaults() {
    let config = CoordinatorConfig::default();
    assert_eq!(config.ping_timeout(), Duration::from_secs(1));
    assert_eq!(config.analysis_timeout(), Duration::from_secs(3));
    assert_eq!(config.settle_delay(), Duration::from_millis(800));
    assert_eq!(config.retry_delay(), Duration::from_millis(500));
    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
}

#[test]
fn test_popup_defaults() {
    let config = PopupConfig::default();
    assert_eq!(config.ui_timeout(), Duration::from_secs(5));
    assert_eq!(config.progress_interval(), Duration::from_millis(100));
    assert_eq!(config.progress_step, 2);
    assert_eq!(config.progress_cap, 90);
    assert_eq!(config.slow_notice_after(), Duration::from_secs(4));
}

#[test]
fn test_analyzer_defaults() {
    let config = AnalyzerConfig::default();
    assert_eq!(config.probe_timeout(), Duration::from_secs(2));
    assert_eq!(config.inline_script_threshold, 5);
}

#[test]
fn test_storage_default_path() {
    let config = StorageConfig::default();
    assert!(config.enabled);
    assert!(config.path.ends_with(".siteprobe/analysis") || config.path.ends_with("analysis"));
}

#[test]
fn test_logging_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert!(config.directory.is_none());
}

#[test]
fn test_host_default() {
    let config = HostConfig::default();
    assert!(!config.auto_inject);
    assert_eq!(config.user_agent, "SiteProbe/0.1");
    assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str(
        r#"
        [coordinator]
        max_attempts = 4
        "#,
    )
    .unwrap();
    assert_eq!(config.coordinator.max_attempts, 4);
    assert_eq!(config.coordinator.ping_timeout_ms, 1000);
    assert_eq!(config.popup.ui_timeout_ms, 5000);
}

use super::*;

fn config_with_existing_storage() -> Config {
    let mut config = Config::default();
    config.storage.path = std::env::temp_dir();
    config
}

#[test]
fn test_validate_default_config() {
    let config = config_with_existing_storage();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_validate_zero_ping_timeout() {
    let mut config = config_with_existing_storage();
    config.coordinator.ping_timeout_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "coordinator.ping_timeout_ms"));
}

#[test]
fn test_validate_zero_analysis_timeout() {
    let mut config = config_with_existing_storage();
    config.coordinator.analysis_timeout_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "coordinator.analysis_timeout_ms"));
}

#[test]
fn test_validate_zero_attempts() {
    let mut config = config_with_existing_storage();
    config.coordinator.max_attempts = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "coordinator.max_attempts"));
}

#[test]
fn test_validate_high_attempts_warning() {
    let mut config = config_with_existing_storage();
    config.coordinator.max_attempts = 50;
    config.popup.ui_timeout_ms = 1_000_000;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "coordinator.max_attempts"));
}

#[test]
fn test_validate_progress_cap_above_100() {
    let mut config = config_with_existing_storage();
    config.popup.progress_cap = 120;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "popup.progress_cap"));
}

#[test]
fn test_validate_zero_ui_timeout() {
    let mut config = config_with_existing_storage();
    config.popup.ui_timeout_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "popup.ui_timeout_ms"));
}

#[test]
fn test_validate_ui_timeout_shorter_than_attempt_warns() {
    let mut config = config_with_existing_storage();
    config.popup.ui_timeout_ms = 1000;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "popup.ui_timeout_ms"));
}

#[test]
fn test_validate_missing_storage_path_warns() {
    let mut config = Config::default();
    config.storage.path = "/nonexistent/siteprobe/store".into();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "storage.path"));
}

#[test]
fn test_validate_disabled_storage_skips_path_check() {
    let mut config = Config::default();
    config.storage.enabled = false;
    config.storage.path = "/nonexistent/siteprobe/store".into();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.warnings.iter().any(|w| w.path == "storage.path"));
}

#[test]
fn test_validate_unknown_log_level() {
    let mut config = config_with_existing_storage();
    config.logging.level = "verbose".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));
}

#[test]
fn test_validate_log_directive_accepted() {
    let mut config = config_with_existing_storage();
    config.logging.level = "siteprobe_coordinator=debug".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.warnings.iter().any(|w| w.path == "logging.level"));
}

#[test]
fn test_ensure_valid_reports_first_error() {
    let mut config = config_with_existing_storage();
    config.analyzer.probe_timeout_ms = 0;

    let err = ConfigValidator::ensure_valid(&config).unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "analyzer.probe_timeout_ms"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_validation_result_add() {
    let mut result = ValidationResult::default();
    assert!(result.is_valid());

    result.add_warning(ValidationWarning::new("a", "warn"));
    assert!(result.is_valid());

    result.add_error(ValidationError::new("b", "err"));
    assert!(!result.is_valid());
}

#[test]
fn test_validate_probe_timeout_not_shorter_than_analysis() {
    let mut config = config_with_existing_storage();
    config.coordinator.analysis_timeout_ms = 3000;
    config.analyzer.probe_timeout_ms = 3000;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "analyzer.probe_timeout_ms"));

    config.analyzer.probe_timeout_ms = 2999;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
}

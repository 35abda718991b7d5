//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_coordinator(config, &mut result);
        Self::validate_popup(config, &mut result);
        Self::validate_analyzer(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    /// Validate and turn the first error into a [`ConfigError::InvalidValue`].
    pub fn ensure_valid(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = Self::validate(config)?;
        if result.errors.is_empty() {
            return Ok(result);
        }
        let first = result.errors.remove(0);
        Err(ConfigError::InvalidValue {
            field: first.path,
            message: first.message,
        })
    }

    fn validate_coordinator(config: &Config, result: &mut ValidationResult) {
        let coordinator = &config.coordinator;
        let timeouts = [
            ("coordinator.ping_timeout_ms", coordinator.ping_timeout_ms),
            ("coordinator.analysis_timeout_ms", coordinator.analysis_timeout_ms),
        ];
        for (path, value) in timeouts {
            if value == 0 {
                result.add_error(ValidationError::new(path, "timeout must be greater than 0"));
            }
        }

        if coordinator.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "coordinator.max_attempts",
                "max_attempts must be greater than 0",
            ));
        }

        if coordinator.max_attempts > 10 {
            result.add_warning(ValidationWarning::new(
                "coordinator.max_attempts",
                "max_attempts is very high (>10), failed pages will keep the popup waiting",
            ));
        }

        if coordinator.cache_ttl_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "coordinator.cache_ttl_secs",
                "cache_ttl_secs is 0, cached analyses are never served as fresh",
            ));
        }
    }

    fn validate_popup(config: &Config, result: &mut ValidationResult) {
        let popup = &config.popup;
        if popup.ui_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "popup.ui_timeout_ms",
                "timeout must be greater than 0",
            ));
        }

        if popup.progress_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "popup.progress_interval_ms",
                "progress_interval_ms must be greater than 0",
            ));
        }

        if popup.progress_cap > 100 {
            result.add_error(ValidationError::new(
                "popup.progress_cap",
                format!("progress_cap must be at most 100, got {}", popup.progress_cap),
            ));
        }

        let coordinator = &config.coordinator;
        if popup.ui_timeout_ms < coordinator.analysis_timeout_ms {
            result.add_warning(ValidationWarning::new(
                "popup.ui_timeout_ms",
                format!(
                    "ui_timeout_ms ({}) is shorter than one analysis attempt ({}), the popup will always fall back to a quick analysis",
                    popup.ui_timeout_ms, coordinator.analysis_timeout_ms
                ),
            ));
        }
    }

    fn validate_analyzer(config: &Config, result: &mut ValidationResult) {
        let probe_timeout_ms = config.analyzer.probe_timeout_ms;
        if probe_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "analyzer.probe_timeout_ms",
                "timeout must be greater than 0",
            ));
        }

        // A reachability probe must end before the coordinator gives up on
        // the whole page analysis.
        let analysis_timeout_ms = config.coordinator.analysis_timeout_ms;
        if analysis_timeout_ms > 0 && probe_timeout_ms >= analysis_timeout_ms {
            result.add_error(ValidationError::new(
                "analyzer.probe_timeout_ms",
                format!(
                    "probe_timeout_ms ({}) must be shorter than coordinator.analysis_timeout_ms ({})",
                    probe_timeout_ms, analysis_timeout_ms
                ),
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.enabled && !config.storage.path.exists() {
            result.add_warning(ValidationWarning::new(
                "storage.path",
                format!(
                    "Storage path does not exist and will be created: {:?}",
                    config.storage.path
                ),
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = config.logging.level.to_lowercase();
        // Directive strings such as "siteprobe=debug" are passed through untouched.
        if !level.contains('=') && !valid_levels.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, valid_levels
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

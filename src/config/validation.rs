//! Configuration validation.

use super::types::{AppConfig, FilterConfig, OutputConfig, WorkerConfig};

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.worker.validate());
        errors.extend(self.filters.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for WorkerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.offload_threshold == 0 {
            errors.push(ConfigError {
                field: "worker.offload_threshold".to_string(),
                message: "Threshold must be greater than 0".to_string(),
            });
        }
        if self.threads == 0 {
            errors.push(ConfigError {
                field: "worker.threads".to_string(),
                message: "At least one worker thread is required".to_string(),
            });
        }
        errors
    }
}

impl Validatable for FilterConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.low_confidence_threshold > 100 {
            errors.push(ConfigError {
                field: "filters.low_confidence_threshold".to_string(),
                message: format!(
                    "Threshold must be between 0 and 100, got {}",
                    self.low_confidence_threshold
                ),
            });
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(parent) = self.file.as_ref().and_then(|file| file.parent())
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ConfigError {
                field: "output.file".to_string(),
                message: format!("Parent directory does not exist: {}", parent.display()),
            });
        }
        errors
    }
}

//! Configuration types for opossum-tools.

use super::defaults::{
    DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_OFFLOAD_THRESHOLD, DEFAULT_WORKER_THREADS,
};
use crate::filters::SortOption;
use crate::navigation::AllowedSaveOperations;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over the file with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Background panel computation
    pub worker: WorkerConfig,
    /// Save permissions
    pub save: SaveConfig,
    /// Filter and sort defaults
    pub filters: FilterConfig,
    /// Output configuration (format, file)
    pub output: OutputConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Enable or disable the rollup worker.
    pub const fn worker_enabled(mut self, enabled: bool) -> Self {
        self.config.worker.enabled = enabled;
        self
    }

    /// Minimum attributed-resource count for offloading.
    pub const fn offload_threshold(mut self, threshold: usize) -> Self {
        self.config.worker.offload_threshold = threshold;
        self
    }

    pub const fn worker_threads(mut self, threads: usize) -> Self {
        self.config.worker.threads = threads;
        self
    }

    pub const fn allowed_save_operations(mut self, allowed: AllowedSaveOperations) -> Self {
        self.config.save.allowed_operations = allowed;
        self
    }

    pub const fn low_confidence_threshold(mut self, threshold: u32) -> Self {
        self.config.filters.low_confidence_threshold = threshold;
        self
    }

    pub const fn default_sort(mut self, sort: SortOption) -> Self {
        self.config.filters.default_sort = sort;
        self
    }

    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Rollup worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WorkerConfig {
    /// Compute panel data on background threads
    pub enabled: bool,
    /// Requests touching fewer attributed resources are computed inline
    pub offload_threshold: usize,
    /// Number of worker threads
    pub threads: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offload_threshold: DEFAULT_OFFLOAD_THRESHOLD,
            threads: DEFAULT_WORKER_THREADS,
        }
    }
}

/// Save permission configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SaveConfig {
    /// `all` or `none`
    pub allowed_operations: AllowedSaveOperations,
}

/// Filter and sort defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterConfig {
    /// Confidence below this value counts as low (0-100)
    pub low_confidence_threshold: u32,
    /// Initial sort order of attribution lists
    pub default_sort: SortOption,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            default_sort: SortOption::default(),
        }
    }
}

/// Output format of CLI commands.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write to this file instead of stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.worker.enabled);
        assert_eq!(config.worker.offload_threshold, 1000);
        assert_eq!(config.save.allowed_operations, AllowedSaveOperations::All);
        assert_eq!(config.filters.low_confidence_threshold, 60);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .worker_enabled(false)
            .allowed_save_operations(AllowedSaveOperations::None)
            .output_format(OutputFormat::Json)
            .build();
        assert!(!config.worker.enabled);
        assert_eq!(config.save.allowed_operations, AllowedSaveOperations::None);
        assert_eq!(config.output.format, OutputFormat::Json);
    }
}

//! Configuration for opossum-tools.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Configuration File
//!
//! Place a `.opossum-tools.yaml` file in your project root or `~/.config/opossum-tools/`:
//!
//! ```yaml
//! worker:
//!   enabled: true
//!   offload_threshold: 1000
//! save:
//!   allowed_operations: all
//! filters:
//!   low_confidence_threshold: 60
//!   default_sort: alphabetical
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_OFFLOAD_THRESHOLD,
    DEFAULT_WORKER_THREADS,
};
pub use file::{
    ConfigFileError, discover_config_file, generate_example_config, load_config_file,
    load_or_default,
};
pub use types::{
    AppConfig, AppConfigBuilder, FilterConfig, OutputConfig, OutputFormat, SaveConfig,
    WorkerConfig,
};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.opossum-tools.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

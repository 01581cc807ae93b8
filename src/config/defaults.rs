//! Default values and named presets.

use super::types::{AppConfig, SaveConfig, WorkerConfig};
use crate::navigation::AllowedSaveOperations;

/// Attributed resources below which panels are computed inline.
pub const DEFAULT_OFFLOAD_THRESHOLD: usize = 1000;

/// Rollup worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 1;

/// Attribution confidence below which a record counts as low confidence.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: u32 = 60;

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigPreset {
    /// Default settings
    Default,
    /// Offload early and use more threads, for very large scans
    LargeProject,
    /// Saving disabled
    ReadOnly,
}

impl ConfigPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::LargeProject => "large-project",
            Self::ReadOnly => "read-only",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "large-project" | "large" => Some(Self::LargeProject),
            "read-only" | "readonly" => Some(Self::ReadOnly),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::LargeProject => Self {
                worker: WorkerConfig {
                    enabled: true,
                    offload_threshold: DEFAULT_OFFLOAD_THRESHOLD / 10,
                    threads: 4,
                },
                ..Self::default()
            },
            ConfigPreset::ReadOnly => Self {
                save: SaveConfig {
                    allowed_operations: AllowedSaveOperations::None,
                },
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names_round_trip() {
        for preset in [
            ConfigPreset::Default,
            ConfigPreset::LargeProject,
            ConfigPreset::ReadOnly,
        ] {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(ConfigPreset::from_name("unknown"), None);
    }

    #[test]
    fn test_read_only_preset_disables_saving() {
        let config = AppConfig::from_preset(ConfigPreset::ReadOnly);
        assert_eq!(config.save.allowed_operations, AllowedSaveOperations::None);
        assert_eq!(config.worker, WorkerConfig::default());
    }
}

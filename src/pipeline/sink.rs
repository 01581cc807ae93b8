//! Save sink writing the save payload as JSON.

use crate::model::SaveFileArgs;
use crate::navigation::SaveSink;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes every save payload to one file, replacing its content.
///
/// Failures are logged and never reach the caller.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, args: &SaveFileArgs) -> Result<()> {
        let json = serde_json::to_string_pretty(args).context("Failed to serialize save payload")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl SaveSink for JsonFileSink {
    fn save(&self, args: &SaveFileArgs) {
        match self.write(args) {
            Ok(()) => tracing::debug!(
                path = %self.path.display(),
                attributions = args.manual_attributions.len(),
                "Saved"
            ),
            Err(e) => tracing::error!("Save failed: {e:#}"),
        }
    }
}

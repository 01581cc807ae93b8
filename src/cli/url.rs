//! URL command handler.
//!
//! Implements the `url` subcommand: the source URL of a resource, optionally
//! opened in the system browser.

use crate::config::AppConfig;
use crate::error::{OpossumError, Result as CoreResult};
use crate::links::LinkOpener;
use crate::navigation::{AppState, PopupType};
use crate::pipeline::{LinkCheck, OutputTarget, exit_codes, load_file_content, render, write_output};
use anyhow::{Result, bail};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;

/// URL command configuration
#[derive(Debug, Clone)]
pub struct UrlConfig {
    pub file: PathBuf,
    pub resource_id: String,
    pub open: bool,
    pub strict: bool,
    pub app: AppConfig,
    pub quiet: bool,
}

/// Output of the `url` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlReport {
    pub resource_id: String,
    pub url: Option<String>,
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> CoreResult<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        } else {
            Command::new("xdg-open")
        };

        let status = command.arg(url).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(OpossumError::validation(format!(
                "opener exited with {status} for {url}"
            )))
        }
    }
}

/// Run the url command.
///
/// Returns [`exit_codes::NO_MATCH`] when the resource has no URL.
pub fn run_url(config: UrlConfig) -> Result<i32> {
    let check = if config.strict {
        LinkCheck::Strict
    } else {
        LinkCheck::Lenient
    };
    let mut state = AppState::new();
    state.load_from_file(load_file_content(&config.file, check)?);

    if state
        .resource_state()
        .resources
        .resolve(&config.resource_id)
        .is_err()
    {
        bail!("Resource not found: {}", config.resource_id);
    }

    let url = state.resource_url(&config.resource_id);
    if config.open && url.is_some() {
        state.open_resource_link(&config.resource_id, &SystemOpener);
        if state.is_popup_open(PopupType::InvalidLinkPopup) {
            bail!("Could not open the link of {}", config.resource_id);
        }
    }

    let report = UrlReport {
        resource_id: config.resource_id.clone(),
        url,
    };
    let output = render(&report, config.app.output.format, |report| {
        report
            .url
            .clone()
            .unwrap_or_else(|| format!("No URL for {}", report.resource_id))
    })?;
    write_output(
        &output,
        &OutputTarget::from_option(config.app.output.file.clone()),
        config.quiet,
    )?;

    Ok(if report.url.is_some() {
        exit_codes::SUCCESS
    } else {
        exit_codes::NO_MATCH
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "resources": {"repo": {"src": {"lib.rs": 1}}},
        "baseUrlsForSources": {"/repo/": "https://example.com/repo/{path}"}
    }"#;

    fn config(dir: &TempDir, resource_id: &str) -> UrlConfig {
        let file = dir.path().join("snapshot.json");
        std::fs::write(&file, SNAPSHOT).unwrap();
        let mut app = AppConfig::default();
        app.output.file = Some(dir.path().join("out.txt"));
        UrlConfig {
            file,
            resource_id: resource_id.to_string(),
            open: false,
            strict: true,
            app,
            quiet: true,
        }
    }

    #[test]
    fn test_prints_url() {
        let dir = TempDir::new().unwrap();
        let code = run_url(config(&dir, "/repo/src/lib.rs")).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
        let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out, "https://example.com/repo/src/lib.rs");
    }

    #[test]
    fn test_no_url_is_no_match() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run_url(config(&dir, "/repo/")).unwrap(), exit_codes::SUCCESS);
        let mut root = config(&dir, "/");
        root.open = true;
        assert_eq!(run_url(root).unwrap(), exit_codes::NO_MATCH);
    }

    #[test]
    fn test_unknown_resource_fails() {
        let dir = TempDir::new().unwrap();
        assert!(run_url(config(&dir, "/missing.rs")).is_err());
    }
}

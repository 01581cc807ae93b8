//! Locate command handler.
//!
//! Implements the `locate` subcommand: which resources carry signals matching
//! a criticality, license and search-term query.

use crate::config::AppConfig;
use crate::filters::{LocateFilters, LocatedResources, SelectedCriticality, locate_resources};
use crate::pipeline::{LinkCheck, OutputTarget, exit_codes, load_file_content, render, write_output};
use crate::store::ResourceState;
use anyhow::{Result, bail};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Locate command configuration
#[derive(Debug, Clone)]
pub struct LocateConfig {
    pub file: PathBuf,
    pub criticality: SelectedCriticality,
    pub licenses: Vec<String>,
    pub search_term: Option<String>,
    pub license_only: bool,
    pub strict: bool,
    pub app: AppConfig,
    pub quiet: bool,
}

impl LocateConfig {
    /// The query described by the command line.
    #[must_use]
    pub fn filters(&self) -> LocateFilters {
        LocateFilters {
            selected_criticality: self.criticality,
            selected_licenses: self.licenses.iter().cloned().collect(),
            search_term: self.search_term.clone().unwrap_or_default(),
            search_only_license_name: self.license_only,
        }
    }
}

/// Run the locate command.
///
/// Returns [`exit_codes::NO_MATCH`] when nothing was located.
pub fn run_locate(config: LocateConfig) -> Result<i32> {
    let filters = config.filters();
    if !filters.is_active() {
        bail!("No locate criterion given (use --criticality, --license or --search)");
    }

    let check = if config.strict {
        LinkCheck::Strict
    } else {
        LinkCheck::Lenient
    };
    let state = ResourceState::from_file_content(load_file_content(&config.file, check)?);

    let located = locate_resources(state.external_data(), &filters, &state.frequent_licenses);
    if !config.quiet {
        tracing::info!(
            located = located.located_resources.len(),
            ancestors = located.resources_with_located_children.len(),
            "Locate finished"
        );
    }

    let output = render(&located, config.app.output.format, format_located_text)?;
    write_output(
        &output,
        &OutputTarget::from_option(config.app.output.file.clone()),
        config.quiet,
    )?;

    Ok(if located.is_empty() {
        exit_codes::NO_MATCH
    } else {
        exit_codes::SUCCESS
    })
}

fn format_located_text(located: &LocatedResources) -> String {
    if located.is_empty() {
        return "No resources located".to_string();
    }
    let mut out = String::new();
    for resource_id in &located.located_resources {
        let _ = writeln!(out, "{resource_id}");
    }
    out.trim_end().to_string()
}

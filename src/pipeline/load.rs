//! Loading file snapshots.
//!
//! The on-disk project format is produced elsewhere; this loader reads the
//! already parsed JSON snapshot (`ParsedFileContent`, camelCase fields).

use crate::error::{ErrorContext, LoadErrorKind, OpossumError, Result};
use crate::model::{AttributionsWithResources, ParsedFileContent, Resources};
use std::path::Path;

/// How strictly link tables are checked on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkCheck {
    /// Report dangling links and continue; the store drops them
    #[default]
    Lenient,
    /// Fail on the first dangling link
    Strict,
}

/// Parse a snapshot from a JSON string and check its link tables.
pub fn parse_file_content_str(content: &str, check: LinkCheck) -> Result<ParsedFileContent> {
    let parsed: ParsedFileContent = serde_json::from_str(content)?;

    let problems = link_problems(&parsed);
    if let Some(first) = problems.first() {
        match check {
            LinkCheck::Strict => {
                return Err(OpossumError::load("checking links", first.clone()));
            }
            LinkCheck::Lenient => {
                tracing::warn!(
                    count = problems.len(),
                    first = %first,
                    "Snapshot contains dangling links, they will be dropped"
                );
            }
        }
    }

    Ok(parsed)
}

/// Read and parse a snapshot file.
pub fn load_file_content(path: &Path, check: LinkCheck) -> Result<ParsedFileContent> {
    tracing::info!("Loading snapshot: {}", path.display());

    let raw = std::fs::read_to_string(path).map_err(|e| OpossumError::io(path, e))?;
    let content = parse_file_content_str(&raw, check)
        .with_context(|| format!("loading {}", path.display()))?;

    tracing::debug!(
        manual = content.manual_attributions.attributions.len(),
        external = content.external_attributions.attributions.len(),
        breakpoints = content.attribution_breakpoints.len(),
        "Parsed snapshot"
    );
    Ok(content)
}

/// Every link that points at an unknown resource or attribution.
#[must_use]
pub fn link_problems(content: &ParsedFileContent) -> Vec<LoadErrorKind> {
    let mut problems = dataset_problems(&content.resources, &content.manual_attributions);
    problems.extend(dataset_problems(
        &content.resources,
        &content.external_attributions,
    ));
    problems
}

fn dataset_problems(
    resources: &Resources,
    dataset: &AttributionsWithResources,
) -> Vec<LoadErrorKind> {
    let mut problems = Vec::new();
    for (resource_id, attribution_ids) in &dataset.resources_to_attributions {
        let resource_known = resources.contains(resource_id);
        for attribution_id in attribution_ids {
            if !resource_known {
                problems.push(LoadErrorKind::DanglingResource {
                    attribution_id: attribution_id.clone(),
                    resource_id: resource_id.clone(),
                });
            } else if !dataset.attributions.contains_key(attribution_id) {
                problems.push(LoadErrorKind::UnknownAttribution {
                    resource_id: resource_id.clone(),
                    attribution_id: attribution_id.clone(),
                });
            }
        }
    }
    problems
}

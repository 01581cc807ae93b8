//! Panels command handler.
//!
//! Implements the `panels` subcommand: the attribution panels shown for one
//! resource, optionally filtered and sorted.

use crate::aggregation::{AttributionIdWithCount, PanelData};
use crate::config::AppConfig;
use crate::filters::{ActiveFilters, SortOption, filter_attributions, sort_attribution_ids};
use crate::model::{AttributionId, PackageInfo};
use crate::navigation::AppState;
use crate::pipeline::{LinkCheck, OutputTarget, exit_codes, load_file_content, render, write_output};
use crate::worker::RollupBridge;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Panels command configuration
#[derive(Debug, Clone)]
pub struct PanelsConfig {
    pub file: PathBuf,
    pub resource_id: String,
    pub filters: ActiveFilters,
    pub sort: Option<SortOption>,
    pub strict: bool,
    pub app: AppConfig,
    pub quiet: bool,
}

/// One card of a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub attribution_id: AttributionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

impl CardSummary {
    fn new(attribution_id: &str, count: Option<usize>, info: &PackageInfo) -> Self {
        Self {
            attribution_id: attribution_id.to_string(),
            count,
            label: info.label(),
            license_name: info.license_name.clone(),
            purl: info.purl(),
        }
    }
}

/// One panel with its cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSummary {
    pub title: String,
    pub cards: Vec<CardSummary>,
}

/// Output of the `panels` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelsReport {
    pub resource_id: String,
    /// Manual attributions of the resource, inherited ones included
    pub attributions: Vec<CardSummary>,
    pub panels: Vec<PanelSummary>,
}

/// Run the panels command, returning the desired exit code.
pub fn run_panels(config: PanelsConfig) -> Result<i32> {
    let check = if config.strict {
        LinkCheck::Strict
    } else {
        LinkCheck::Lenient
    };
    let content = load_file_content(&config.file, check)?;

    let mut state = AppState::new();
    state.set_allowed_save_operations(config.app.save.allowed_operations);
    state.load_from_file(content);

    if state
        .resource_state()
        .resources
        .resolve(&config.resource_id)
        .is_err()
    {
        bail!("Resource not found: {}", config.resource_id);
    }
    state.set_selected_resource_id_or_open_unsaved_popup(config.resource_id.clone());

    let mut bridge = RollupBridge::new(&config.app.worker);
    let handle = bridge.request(state.rollup_request());
    bridge.wait_for(&handle);
    let panels = bridge
        .panel_data()
        .context("Panel computation produced no result")?;

    let sort = config.sort.unwrap_or(config.app.filters.default_sort);
    let threshold = config.app.filters.low_confidence_threshold;
    let report = PanelsReport {
        resource_id: config.resource_id.clone(),
        attributions: manual_cards(&state, &config.filters, sort, threshold),
        panels: panels
            .iter()
            .map(|panel| summarize_panel(panel, &config.filters, sort, threshold))
            .collect(),
    };

    let output = render(&report, config.app.output.format, format_panels_text)?;
    write_output(
        &output,
        &OutputTarget::from_option(config.app.output.file.clone()),
        config.quiet,
    )?;

    Ok(exit_codes::SUCCESS)
}

fn manual_cards(
    state: &AppState,
    filters: &ActiveFilters,
    sort: SortOption,
    threshold: u32,
) -> Vec<CardSummary> {
    let manual = state.resource_state().manual_data();
    let attributions = state
        .manual_attribution_ids_of_selected_resource()
        .into_iter()
        .filter_map(|id| manual.get(&id).map(|info| (id, info.clone())))
        .collect();
    let visible = filter_attributions(&attributions, filters, threshold);
    sort_attribution_ids(&visible, sort, None)
        .iter()
        .filter_map(|id| visible.get(id).map(|info| CardSummary::new(id, None, info)))
        .collect()
}

/// Filter and sort the cards of one panel.
#[must_use]
pub fn summarize_panel(
    panel: &PanelData,
    filters: &ActiveFilters,
    sort: SortOption,
    threshold: u32,
) -> PanelSummary {
    let visible = filter_attributions(&panel.attributions, filters, threshold);
    let counts: &[AttributionIdWithCount] = &panel.attribution_ids_with_count;

    // Panels come ordered by count already; only re-sort on request.
    let ids: Vec<AttributionId> = if sort == SortOption::Occurrence {
        counts
            .iter()
            .map(|entry| entry.attribution_id.clone())
            .filter(|id| visible.contains_key(id))
            .collect()
    } else {
        let shown = counts
            .iter()
            .filter_map(|entry| {
                visible
                    .get(&entry.attribution_id)
                    .map(|info| (entry.attribution_id.clone(), info.clone()))
            })
            .collect();
        sort_attribution_ids(&shown, sort, Some(counts))
    };

    let cards = ids
        .iter()
        .filter_map(|id| {
            let count = counts
                .iter()
                .find(|entry| &entry.attribution_id == id)
                .and_then(|entry| entry.count);
            visible.get(id).map(|info| CardSummary::new(id, count, info))
        })
        .collect();

    PanelSummary {
        title: panel.title.to_string(),
        cards,
    }
}

fn format_card(out: &mut String, card: &CardSummary) {
    let _ = write!(out, "  {}", card.label);
    if let Some(license) = &card.license_name {
        let _ = write!(out, " [{license}]");
    }
    if let Some(count) = card.count {
        let _ = write!(out, " ({count})");
    }
    let _ = writeln!(out, "  <{}>", card.attribution_id);
}

fn format_panels_text(report: &PanelsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resource: {}", report.resource_id);

    let _ = writeln!(out, "\nAttributions");
    if report.attributions.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for card in &report.attributions {
        format_card(&mut out, card);
    }

    for panel in &report.panels {
        let _ = writeln!(out, "\n{}", panel.title);
        if panel.cards.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for card in &panel.cards {
            format_card(&mut out, card);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::PackagePanelTitle;
    use crate::filters::Filter;
    use crate::model::Attributions;

    fn info(name: &str, first_party: bool) -> PackageInfo {
        PackageInfo {
            package_name: Some(name.to_string()),
            first_party,
            ..PackageInfo::default()
        }
    }

    fn panel() -> PanelData {
        let attributions: Attributions = [
            ("a".to_string(), info("zlib", false)),
            ("b".to_string(), info("acme", true)),
            ("c".to_string(), info("bzip2", false)),
        ]
        .into_iter()
        .collect();
        PanelData {
            title: PackagePanelTitle::ContainedExternalPackages,
            attribution_ids_with_count: vec![
                AttributionIdWithCount::new("a", Some(3)),
                AttributionIdWithCount::new("b", Some(2)),
                AttributionIdWithCount::new("c", Some(1)),
            ],
            attributions,
            display_package_infos: Vec::new(),
        }
    }

    #[test]
    fn test_occurrence_keeps_panel_order() {
        let summary = summarize_panel(&panel(), &ActiveFilters::new(), SortOption::Occurrence, 60);
        let ids: Vec<&str> = summary.cards.iter().map(|c| c.attribution_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(summary.cards[0].count, Some(3));
    }

    #[test]
    fn test_filter_and_alphabetical_sort() {
        let filters: ActiveFilters = [Filter::HideFirstParty].into_iter().collect();
        let summary = summarize_panel(&panel(), &filters, SortOption::Alphabetical, 60);
        let ids: Vec<&str> = summary.cards.iter().map(|c| c.attribution_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_text_format_lists_panels() {
        let report = PanelsReport {
            resource_id: "/".to_string(),
            attributions: Vec::new(),
            panels: vec![summarize_panel(
                &panel(),
                &ActiveFilters::new(),
                SortOption::Occurrence,
                60,
            )],
        };
        let text = format_panels_text(&report);
        assert!(text.contains("Signals in Folder Content"));
        assert!(text.contains("zlib (3)  <a>"));
        assert!(text.contains("(none)"));
    }
}

//! Panel data for the selected resource.

use super::children::{AttributionIdWithCount, compute_aggregated_attributions_from_children};
use super::hashes::group_by_hash;
use crate::model::{
    AttributionData, AttributionId, Attributions, DisplayPackageInfo, ResourceId,
    is_resource_with_children,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which panel a package card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackagePanelTitle {
    /// Manual attributions directly on the resource
    ManualPackages,
    /// Signals directly on the resource
    ExternalPackages,
    /// Signals found below a folder
    ContainedExternalPackages,
    /// Manual attributions found below a folder
    ContainedManualPackages,
}

impl fmt::Display for PackagePanelTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Self::ManualPackages => "Attributions",
            Self::ExternalPackages => "Signals",
            Self::ContainedExternalPackages => "Signals in Folder Content",
            Self::ContainedManualPackages => "Attributions in Folder Content",
        };
        f.write_str(title)
    }
}

/// Content of one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelData {
    pub title: PackagePanelTitle,
    pub attribution_ids_with_count: Vec<AttributionIdWithCount>,
    /// Records referenced by the cards of this panel
    pub attributions: Attributions,
    /// One card per entry of `attribution_ids_with_count`, same order
    pub display_package_infos: Vec<DisplayPackageInfo>,
}

/// Borrowed inputs of [`get_panel_data`].
#[derive(Debug, Clone, Copy)]
pub struct PanelDataInput<'a> {
    pub selected_resource_id: &'a str,
    pub manual_data: &'a AttributionData,
    pub external_data: &'a AttributionData,
    pub resolved_external_attribution_ids: &'a HashSet<AttributionId>,
    pub files_with_children: &'a HashSet<ResourceId>,
    pub external_attributions_to_hashes: &'a HashMap<AttributionId, String>,
}

/// Compute the panels shown for the selected resource.
///
/// The direct-signals panel is always present; folders (and files with
/// children) additionally get the two folder-content panels.
#[must_use]
pub fn get_panel_data(input: &PanelDataInput<'_>) -> Vec<PanelData> {
    let mut panels = vec![external_packages_panel(input)];

    if is_resource_with_children(input.selected_resource_id, input.files_with_children) {
        panels.push(contained_panel(
            PackagePanelTitle::ContainedExternalPackages,
            input.selected_resource_id,
            input.external_data,
            input.resolved_external_attribution_ids,
        ));
        panels.push(contained_panel(
            PackagePanelTitle::ContainedManualPackages,
            input.selected_resource_id,
            input.manual_data,
            &HashSet::new(),
        ));
    }

    panels
}

fn external_packages_panel(input: &PanelDataInput<'_>) -> PanelData {
    let external_data = input.external_data;
    let ids = external_data.attribution_ids_of(input.selected_resource_id);

    let mut attribution_ids_with_count = Vec::new();
    let mut display_package_infos = Vec::new();
    let mut attributions = Attributions::new();

    for group in group_by_hash(ids, input.external_attributions_to_hashes) {
        let Some(first) = group.first() else {
            continue;
        };
        let count = (group.len() > 1).then_some(group.len());
        attribution_ids_with_count.push(AttributionIdWithCount::new((*first).clone(), count));

        let records: Vec<_> = group.iter().filter_map(|id| external_data.get(id)).collect();
        display_package_infos.push(DisplayPackageInfo::merged(records.iter().copied()));
        for record in records {
            attributions.insert(record.id.clone(), record.clone());
        }
    }

    PanelData {
        title: PackagePanelTitle::ExternalPackages,
        attribution_ids_with_count,
        attributions,
        display_package_infos,
    }
}

fn contained_panel(
    title: PackagePanelTitle,
    resource_id: &str,
    data: &AttributionData,
    resolved: &HashSet<AttributionId>,
) -> PanelData {
    let attribution_ids_with_count = compute_aggregated_attributions_from_children(
        data.attributions(),
        data.resources_to_attributions(),
        data.resources_with_attributed_children().children_of(resource_id),
        resolved,
    );

    let mut attributions = Attributions::new();
    let mut display_package_infos = Vec::with_capacity(attribution_ids_with_count.len());
    for entry in &attribution_ids_with_count {
        if let Some(record) = data.get(&entry.attribution_id) {
            attributions.insert(record.id.clone(), record.clone());
            display_package_infos.push(DisplayPackageInfo::from(record));
        } else {
            display_package_infos.push(DisplayPackageInfo::empty());
        }
    }

    PanelData {
        title,
        attribution_ids_with_count,
        attributions,
        display_package_infos,
    }
}

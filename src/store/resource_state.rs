//! Loaded project data: resource tree, both datasets and side tables.

use crate::aggregation::{PanelDataInput, compute_attributions_to_hashes};
use crate::model::{
    AttributionData, AttributionId, BaseUrlsForSources, ExternalAttributionSource,
    FrequentLicenses, ParsedFileContent, ProjectMetadata, ResourceId, Resources, SaveFileArgs,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Everything populated by "load from file" and cleared by "close file".
///
/// Datasets are held in `Arc`s so rollup requests can share them with the
/// worker; mutation goes through copy-on-write.
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    pub metadata: ProjectMetadata,
    pub resources: Resources,
    manual_data: Arc<AttributionData>,
    external_data: Arc<AttributionData>,
    resolved_external_attributions: Arc<HashSet<AttributionId>>,
    pub attribution_breakpoints: HashSet<ResourceId>,
    pub files_with_children: HashSet<ResourceId>,
    pub base_urls_for_sources: BaseUrlsForSources,
    pub frequent_licenses: FrequentLicenses,
    pub external_attribution_sources: IndexMap<String, ExternalAttributionSource>,
    external_attributions_to_hashes: Arc<HashMap<AttributionId, String>>,
    loaded: bool,
}

impl ResourceState {
    /// Populate every dataset from a snapshot at once.
    #[must_use]
    pub fn from_file_content(content: ParsedFileContent) -> Self {
        let ParsedFileContent {
            metadata,
            resources,
            manual_attributions,
            external_attributions,
            frequent_licenses,
            resolved_external_attributions,
            attribution_breakpoints,
            files_with_children,
            base_urls_for_sources,
            external_attribution_sources,
            external_attributions_to_hashes,
        } = content;

        let manual_data = AttributionData::new(
            manual_attributions.attributions,
            manual_attributions.resources_to_attributions,
        );
        let external_data = AttributionData::new(
            external_attributions.attributions,
            external_attributions.resources_to_attributions,
        );
        let hashes = if external_attributions_to_hashes.is_empty() {
            compute_attributions_to_hashes(external_data.attributions())
        } else {
            external_attributions_to_hashes
        };

        tracing::info!(
            manual = manual_data.attributions().len(),
            external = external_data.attributions().len(),
            files = resources.file_count(),
            "Loaded project"
        );

        Self {
            metadata,
            resources,
            manual_data: Arc::new(manual_data),
            external_data: Arc::new(external_data),
            resolved_external_attributions: Arc::new(resolved_external_attributions),
            attribution_breakpoints,
            files_with_children,
            base_urls_for_sources,
            frequent_licenses,
            external_attribution_sources,
            external_attributions_to_hashes: Arc::new(hashes),
            loaded: true,
        }
    }

    /// Whether a file is currently loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn manual_data(&self) -> &AttributionData {
        &self.manual_data
    }

    #[must_use]
    pub fn external_data(&self) -> &AttributionData {
        &self.external_data
    }

    /// Shared handle to the manual dataset.
    #[must_use]
    pub fn manual_data_arc(&self) -> Arc<AttributionData> {
        Arc::clone(&self.manual_data)
    }

    /// Shared handle to the external dataset.
    #[must_use]
    pub fn external_data_arc(&self) -> Arc<AttributionData> {
        Arc::clone(&self.external_data)
    }

    /// Mutable manual dataset, cloned first if a rollup still holds it.
    pub fn manual_data_mut(&mut self) -> &mut AttributionData {
        Arc::make_mut(&mut self.manual_data)
    }

    #[must_use]
    pub fn resolved_external_attributions(&self) -> &HashSet<AttributionId> {
        &self.resolved_external_attributions
    }

    #[must_use]
    pub fn resolved_external_attributions_arc(&self) -> Arc<HashSet<AttributionId>> {
        Arc::clone(&self.resolved_external_attributions)
    }

    #[must_use]
    pub fn external_attributions_to_hashes(&self) -> &HashMap<AttributionId, String> {
        &self.external_attributions_to_hashes
    }

    #[must_use]
    pub fn external_attributions_to_hashes_arc(&self) -> Arc<HashMap<AttributionId, String>> {
        Arc::clone(&self.external_attributions_to_hashes)
    }

    /// Mark signals as resolved. Unknown ids are ignored.
    pub fn resolve_external_attributions<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<AttributionId>,
    {
        let external = Arc::clone(&self.external_data);
        let resolved = Arc::make_mut(&mut self.resolved_external_attributions);
        ids.into_iter()
            .map(Into::into)
            .filter(|id| external.contains(id))
            .filter(|id| resolved.insert(id.clone()))
            .count()
    }

    /// Undo [`resolve_external_attributions`](Self::resolve_external_attributions).
    pub fn unresolve_external_attributions<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<AttributionId>,
    {
        let resolved = Arc::make_mut(&mut self.resolved_external_attributions);
        ids.into_iter()
            .map(Into::into)
            .filter(|id| resolved.remove(id))
            .count()
    }

    /// Borrowed panel inputs for a resource.
    #[must_use]
    pub fn panel_input<'a>(&'a self, selected_resource_id: &'a str) -> PanelDataInput<'a> {
        PanelDataInput {
            selected_resource_id,
            manual_data: &self.manual_data,
            external_data: &self.external_data,
            resolved_external_attribution_ids: &self.resolved_external_attributions,
            files_with_children: &self.files_with_children,
            external_attributions_to_hashes: &self.external_attributions_to_hashes,
        }
    }

    /// Payload for the save sink.
    #[must_use]
    pub fn save_file_args(&self) -> SaveFileArgs {
        let mut resolved: IndexSet<AttributionId> =
            self.resolved_external_attributions.iter().cloned().collect();
        resolved.sort();
        SaveFileArgs {
            manual_attributions: self.manual_data.attributions().clone(),
            resources_to_attributions: self.manual_data.resources_to_attributions().clone(),
            resolved_external_attributions: resolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributionsWithResources, PackageInfo};

    fn content() -> ParsedFileContent {
        let signal = PackageInfo {
            id: "s1".to_string(),
            package_name: Some("lodash".to_string()),
            ..Default::default()
        };
        ParsedFileContent {
            resources: Resources::from_paths(["/a.js"]),
            external_attributions: AttributionsWithResources {
                attributions: [("s1".to_string(), signal)].into_iter().collect(),
                resources_to_attributions: [("/a.js".to_string(), vec!["s1".to_string()])]
                    .into_iter()
                    .collect(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_load_derives_hashes() {
        let state = ResourceState::from_file_content(content());
        assert!(state.is_loaded());
        assert!(state.external_attributions_to_hashes().contains_key("s1"));
    }

    #[test]
    fn test_resolve_ignores_unknown_ids() {
        let mut state = ResourceState::from_file_content(content());
        assert_eq!(state.resolve_external_attributions(["s1", "nope"]), 1);
        assert_eq!(state.resolve_external_attributions(["s1"]), 0);
        assert_eq!(state.save_file_args().resolved_external_attributions.len(), 1);
        assert_eq!(state.unresolve_external_attributions(["s1"]), 1);
        assert!(state.resolved_external_attributions().is_empty());
    }

    #[test]
    fn test_copy_on_write_keeps_shared_snapshot() {
        let mut state = ResourceState::from_file_content(content());
        let snapshot = state.manual_data_arc();
        state.manual_data_mut().upsert(PackageInfo {
            id: "m1".to_string(),
            package_name: Some("x".to_string()),
            ..Default::default()
        });
        assert!(snapshot.attributions().is_empty());
        assert_eq!(state.manual_data().attributions().len(), 1);
    }
}

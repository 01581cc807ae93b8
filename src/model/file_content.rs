//! Snapshot types exchanged with the file loader and the save sink.

use super::attribution_data::{Attributions, ResourcesToAttributions};
use super::package_info::AttributionId;
use super::resources::{ResourceId, Resources};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Records plus links as they appear in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributionsWithResources {
    pub attributions: Attributions,
    pub resources_to_attributions: ResourcesToAttributions,
}

/// Base URL templates by resource, `{path}` is replaced by the relative path.
/// A `null` entry explicitly has no URL.
pub type BaseUrlsForSources = IndexMap<ResourceId, Option<String>>;

/// Short and full name of a frequently used license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseName {
    pub short_name: String,
    pub full_name: String,
}

/// Frequently used licenses offered as shortcuts and used as an alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrequentLicenses {
    pub name_order: Vec<LicenseName>,
    pub texts: IndexMap<String, String>,
}

impl FrequentLicenses {
    /// Canonical (short) form of a license name, case-insensitive.
    ///
    /// Names not in the table are returned lowercased.
    #[must_use]
    pub fn canonical_name(&self, name: &str) -> String {
        let lower = name.trim().to_lowercase();
        self.name_order
            .iter()
            .find(|entry| {
                entry.short_name.to_lowercase() == lower || entry.full_name.to_lowercase() == lower
            })
            .map_or(lower, |entry| entry.short_name.to_lowercase())
    }
}

/// Metadata of an external attribution source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAttributionSource {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_relevant_for_preferred: bool,
}

/// Project metadata, carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    pub project_id: String,
    pub file_creation_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
}

/// Everything the loader hands over on "load from file".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedFileContent {
    pub metadata: ProjectMetadata,
    pub resources: Resources,
    pub manual_attributions: AttributionsWithResources,
    pub external_attributions: AttributionsWithResources,
    pub frequent_licenses: FrequentLicenses,
    pub resolved_external_attributions: HashSet<AttributionId>,
    pub attribution_breakpoints: HashSet<ResourceId>,
    pub files_with_children: HashSet<ResourceId>,
    pub base_urls_for_sources: BaseUrlsForSources,
    pub external_attribution_sources: IndexMap<String, ExternalAttributionSource>,
    /// Content hashes of external attributions; derived on load when absent.
    pub external_attributions_to_hashes: HashMap<AttributionId, String>,
}

/// Payload handed to the save sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileArgs {
    pub manual_attributions: Attributions,
    pub resources_to_attributions: ResourcesToAttributions,
    pub resolved_external_attributions: IndexSet<AttributionId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn licenses() -> FrequentLicenses {
        FrequentLicenses {
            name_order: vec![LicenseName {
                short_name: "MIT".to_string(),
                full_name: "MIT License".to_string(),
            }],
            texts: IndexMap::new(),
        }
    }

    #[test]
    fn test_canonical_name_resolves_aliases() {
        let table = licenses();
        assert_eq!(table.canonical_name("MIT License"), "mit");
        assert_eq!(table.canonical_name("mit"), "mit");
        assert_eq!(table.canonical_name("Apache-2.0"), "apache-2.0");
    }

    #[test]
    fn test_parsed_file_content_defaults() {
        let content: ParsedFileContent =
            serde_json::from_str(r#"{"resources": {"a.txt": 1}}"#).unwrap();
        assert!(content.resources.contains("/a.txt"));
        assert!(content.manual_attributions.attributions.is_empty());
        assert!(content.external_attributions_to_hashes.is_empty());
    }
}

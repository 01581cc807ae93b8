//! Locating resources whose signals match a query.
//!
//! A query combines a criticality, a set of license names and a free-text
//! search term. Each criterion is inactive when left at its neutral value
//! and active criteria must all match. License names are compared through
//! the frequent-license alias table, so `MIT` and `MIT License` are the same
//! license when the table says so.

use super::cycle::CycleFilter;
use crate::model::{
    AttributionData, Criticality, FrequentLicenses, PackageInfo, ResourceId, get_parents,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Criticality selector of a locate query.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SelectedCriticality {
    #[default]
    Any,
    High,
    Medium,
}

impl SelectedCriticality {
    #[must_use]
    pub fn matches(self, criticality: Criticality) -> bool {
        match self {
            Self::Any => true,
            Self::High => criticality == Criticality::High,
            Self::Medium => criticality == Criticality::Medium,
        }
    }
}

impl CycleFilter for SelectedCriticality {
    fn next(&self) -> Self {
        match self {
            Self::Any => Self::High,
            Self::High => Self::Medium,
            Self::Medium => Self::Any,
        }
    }

    fn prev(&self) -> Self {
        match self {
            Self::Any => Self::Medium,
            Self::High => Self::Any,
            Self::Medium => Self::High,
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Self::Any => "Any",
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

/// A locate query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocateFilters {
    pub selected_criticality: SelectedCriticality,
    pub selected_licenses: BTreeSet<String>,
    pub search_term: String,
    pub search_only_license_name: bool,
}

impl LocateFilters {
    /// Whether any criterion is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.selected_criticality != SelectedCriticality::Any
            || !self.selected_licenses.is_empty()
            || !self.search_term.trim().is_empty()
    }

    fn compile<'a>(&'a self, frequent_licenses: &'a FrequentLicenses) -> CompiledQuery<'a> {
        CompiledQuery {
            criticality: self.selected_criticality,
            licenses: self
                .selected_licenses
                .iter()
                .map(|name| frequent_licenses.canonical_name(name))
                .collect(),
            search_term: self.search_term.trim().to_lowercase(),
            search_only_license_name: self.search_only_license_name,
            frequent_licenses,
        }
    }

    /// Whether a single record matches every active criterion.
    #[must_use]
    pub fn matches(&self, info: &PackageInfo, frequent_licenses: &FrequentLicenses) -> bool {
        self.is_active() && self.compile(frequent_licenses).matches(info)
    }
}

/// Query with license names resolved and the search term normalized.
struct CompiledQuery<'a> {
    criticality: SelectedCriticality,
    licenses: HashSet<String>,
    search_term: String,
    search_only_license_name: bool,
    frequent_licenses: &'a FrequentLicenses,
}

impl CompiledQuery<'_> {
    fn matches(&self, info: &PackageInfo) -> bool {
        self.criticality.matches(info.criticality)
            && self.matches_license(info)
            && self.matches_search_term(info)
    }

    fn matches_license(&self, info: &PackageInfo) -> bool {
        if self.licenses.is_empty() {
            return true;
        }
        info.license_name
            .as_deref()
            .is_some_and(|name| self.licenses.contains(&self.frequent_licenses.canonical_name(name)))
    }

    fn matches_search_term(&self, info: &PackageInfo) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let contains = |value: Option<&str>| {
            value.is_some_and(|value| value.to_lowercase().contains(&self.search_term))
        };
        let license_hit = contains(info.license_name.as_deref())
            || info.license_name.as_deref().is_some_and(|name| {
                let canonical = self.frequent_licenses.canonical_name(name);
                self.frequent_licenses
                    .name_order
                    .iter()
                    .filter(|entry| entry.short_name.to_lowercase() == canonical)
                    .any(|entry| {
                        entry.full_name.to_lowercase().contains(&self.search_term)
                            || entry.short_name.to_lowercase().contains(&self.search_term)
                    })
            });
        license_hit || (!self.search_only_license_name && contains(info.package_name.as_deref()))
    }
}

/// Result of a locate query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedResources {
    /// Resources with a matching attribution
    pub located_resources: BTreeSet<ResourceId>,
    /// Strict ancestors of located resources
    pub resources_with_located_children: BTreeSet<ResourceId>,
}

impl LocatedResources {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.located_resources.is_empty()
    }
}

/// Run a locate query over a dataset.
///
/// Returns nothing when no criterion is active.
#[must_use]
pub fn locate_resources(
    data: &AttributionData,
    filters: &LocateFilters,
    frequent_licenses: &FrequentLicenses,
) -> LocatedResources {
    if !filters.is_active() {
        return LocatedResources::default();
    }
    let query = filters.compile(frequent_licenses);

    let entries: Vec<(&String, &PackageInfo)> = data.attributions().iter().collect();
    let matching: Vec<&str> = entries
        .par_iter()
        .filter(|(_, info)| query.matches(info))
        .map(|(id, _)| id.as_str())
        .collect();

    let mut located = LocatedResources::default();
    for attribution_id in matching {
        for resource_id in data.resources_of(attribution_id) {
            if located.located_resources.insert(resource_id.clone()) {
                located
                    .resources_with_located_children
                    .extend(get_parents(resource_id));
            }
        }
    }

    tracing::debug!(
        located = located.located_resources.len(),
        ancestors = located.resources_with_located_children.len(),
        "Located resources"
    );
    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LicenseName, ResourcesToAttributions};

    fn signal(id: &str, license: &str, criticality: Criticality) -> PackageInfo {
        PackageInfo {
            id: id.to_string(),
            license_name: Some(license.to_string()),
            criticality,
            ..Default::default()
        }
    }

    fn data(records: Vec<PackageInfo>, links: &[(&str, &str)]) -> AttributionData {
        let attributions = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        let mut r2a = ResourcesToAttributions::new();
        for (resource, attribution) in links {
            r2a.entry((*resource).to_string())
                .or_insert_with(Vec::new)
                .push((*attribution).to_string());
        }
        AttributionData::new(attributions, r2a)
    }

    fn set(items: &[&str]) -> BTreeSet<ResourceId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_criticality_and_license() {
        let data = data(
            vec![
                signal("u1", "MIT", Criticality::High),
                signal("u2", "MIT", Criticality::Medium),
            ],
            &[("/a/", "u1"), ("/a/b", "u2")],
        );
        let filters = LocateFilters {
            selected_criticality: SelectedCriticality::Medium,
            selected_licenses: ["MIT".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let located = locate_resources(&data, &filters, &FrequentLicenses::default());
        assert_eq!(located.located_resources, set(&["/a/b"]));
        assert_eq!(located.resources_with_located_children, set(&["/", "/a/"]));
    }

    #[test]
    fn test_license_alias_matches_either_form() {
        let data = data(
            vec![signal("u1", "MIT License", Criticality::None)],
            &[("/x.js", "u1")],
        );
        let frequent = FrequentLicenses {
            name_order: vec![LicenseName {
                short_name: "MIT".to_string(),
                full_name: "MIT License".to_string(),
            }],
            ..Default::default()
        };
        let filters = LocateFilters {
            selected_licenses: ["mit".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let located = locate_resources(&data, &filters, &frequent);
        assert_eq!(located.located_resources, set(&["/x.js"]));
    }

    #[test]
    fn test_search_term_license_only() {
        let mut record = signal("u1", "Apache-2.0", Criticality::None);
        record.package_name = Some("react".to_string());
        let data = data(vec![record], &[("/r/", "u1")]);

        let mut filters = LocateFilters {
            search_term: "REACT".to_string(),
            ..Default::default()
        };
        assert!(!locate_resources(&data, &filters, &FrequentLicenses::default()).is_empty());

        filters.search_only_license_name = true;
        assert!(locate_resources(&data, &filters, &FrequentLicenses::default()).is_empty());

        filters.search_term = "apache".to_string();
        assert!(!locate_resources(&data, &filters, &FrequentLicenses::default()).is_empty());
    }

    #[test]
    fn test_inactive_query_locates_nothing() {
        let data = data(vec![signal("u1", "MIT", Criticality::High)], &[("/a", "u1")]);
        let located = locate_resources(&data, &LocateFilters::default(), &FrequentLicenses::default());
        assert!(located.is_empty());
        assert!(located.resources_with_located_children.is_empty());
    }
}

//! Sorting of attribution lists.

use super::cycle::CycleFilter;
use crate::aggregation::{AttributionIdWithCount, compare_package_names};
use crate::model::{AttributionId, Attributions, PackageInfo};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order of an attribution list.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// By package name, unnamed last
    #[default]
    Alphabetical,
    /// High before medium before none, then by name
    Criticality,
    /// By occurrence count, then by name
    Occurrence,
}

impl CycleFilter for SortOption {
    fn next(&self) -> Self {
        match self {
            Self::Alphabetical => Self::Criticality,
            Self::Criticality => Self::Occurrence,
            Self::Occurrence => Self::Alphabetical,
        }
    }

    fn prev(&self) -> Self {
        match self {
            Self::Alphabetical => Self::Occurrence,
            Self::Criticality => Self::Alphabetical,
            Self::Occurrence => Self::Criticality,
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Self::Alphabetical => "Alphabetical",
            Self::Criticality => "Criticality",
            Self::Occurrence => "Occurrence",
        }
    }
}

fn by_criticality(a: &PackageInfo, b: &PackageInfo) -> Ordering {
    b.criticality
        .cmp(&a.criticality)
        .then_with(|| compare_package_names(Some(a), Some(b)))
}

/// Ids of `attributions` in the requested order.
///
/// `counts` supplies occurrence counts for [`SortOption::Occurrence`];
/// records without a count sort as zero. Sorting is stable.
#[must_use]
pub fn sort_attribution_ids(
    attributions: &Attributions,
    option: SortOption,
    counts: Option<&[AttributionIdWithCount]>,
) -> Vec<AttributionId> {
    let mut entries: Vec<(&AttributionId, &PackageInfo)> = attributions.iter().collect();

    match option {
        SortOption::Alphabetical => {
            entries.sort_by(|(_, a), (_, b)| compare_package_names(Some(a), Some(b)));
        }
        SortOption::Criticality => entries.sort_by(|(_, a), (_, b)| by_criticality(a, b)),
        SortOption::Occurrence => {
            let count_of = |id: &str| {
                counts
                    .and_then(|counts| counts.iter().find(|c| c.attribution_id == id))
                    .and_then(|c| c.count)
                    .unwrap_or(0)
            };
            entries.sort_by(|(id_a, a), (id_b, b)| {
                count_of(id_b)
                    .cmp(&count_of(id_a))
                    .then_with(|| compare_package_names(Some(a), Some(b)))
            });
        }
    }

    entries.into_iter().map(|(id, _)| id.clone()).collect()
}

/// Records in the requested order.
#[must_use]
pub fn sort_attributions(attributions: &Attributions, option: SortOption) -> Vec<&PackageInfo> {
    sort_attribution_ids(attributions, option, None)
        .iter()
        .filter_map(|id| attributions.get(id))
        .collect()
}

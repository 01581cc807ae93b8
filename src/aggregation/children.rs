//! Counting attributions found below a folder.

use crate::model::{AttributionId, Attributions, PackageInfo, ResourcesToAttributions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// An attribution shown in a panel, with how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionIdWithCount {
    pub attribution_id: AttributionId,
    /// Number of attributed children (folder panels) or merged signals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl AttributionIdWithCount {
    #[must_use]
    pub fn new(attribution_id: impl Into<AttributionId>, count: Option<usize>) -> Self {
        Self {
            attribution_id: attribution_id.into(),
            count,
        }
    }
}

/// Case-insensitive comparison of package names; unnamed records sort last
/// and compare equal to each other.
#[must_use]
pub fn compare_package_names(a: Option<&PackageInfo>, b: Option<&PackageInfo>) -> Ordering {
    let name = |info: Option<&PackageInfo>| {
        info.and_then(|i| i.package_name.as_deref())
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
    };
    match (name(a), name(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Count, per attribution, the attributed children referencing it.
///
/// Resolved ids are skipped. The result is ordered by count (descending),
/// then by package name; the sort is stable so ties between unnamed records
/// keep first-seen order.
pub fn compute_aggregated_attributions_from_children<'a, I>(
    attributions: &Attributions,
    resources_to_attributions: &ResourcesToAttributions,
    attributed_children: I,
    resolved_attribution_ids: &HashSet<AttributionId>,
) -> Vec<AttributionIdWithCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&AttributionId> = Vec::new();
    let mut counts: HashMap<&AttributionId, usize> = HashMap::new();

    for child in attributed_children {
        let Some(ids) = resources_to_attributions.get(child) else {
            continue;
        };
        for id in ids {
            if resolved_attribution_ids.contains(id) {
                continue;
            }
            let count = counts.entry(id).or_insert_with(|| {
                order.push(id);
                0
            });
            *count += 1;
        }
    }

    let mut result: Vec<AttributionIdWithCount> = order
        .into_iter()
        .map(|id| AttributionIdWithCount::new(id.clone(), counts.get(id).copied()))
        .collect();

    result.sort_by(|a, b| {
        b.count.cmp(&a.count).then_with(|| {
            compare_package_names(
                attributions.get(&a.attribution_id),
                attributions.get(&b.attribution_id),
            )
        })
    });
    result
}

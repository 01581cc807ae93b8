//! Predicate filters over attribution collections.

use crate::model::{Attributions, PackageInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One attribution filter. Active filters are combined by intersection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    OnlyFollowUp,
    OnlyFirstParty,
    HideFirstParty,
    OnlyNeedsReview,
    OnlyPreferred,
    PreviouslyPreferred,
    ExcludedFromNotice,
    LowConfidence,
}

impl Filter {
    /// Every filter, in display order.
    pub const ALL: [Self; 8] = [
        Self::OnlyFollowUp,
        Self::OnlyFirstParty,
        Self::HideFirstParty,
        Self::OnlyNeedsReview,
        Self::OnlyPreferred,
        Self::PreviouslyPreferred,
        Self::ExcludedFromNotice,
        Self::LowConfidence,
    ];

    /// Get display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OnlyFollowUp => "Only Follow Up",
            Self::OnlyFirstParty => "Only First Party",
            Self::HideFirstParty => "Hide First Party",
            Self::OnlyNeedsReview => "Only Needs Review",
            Self::OnlyPreferred => "Only Preferred",
            Self::PreviouslyPreferred => "Previously Preferred",
            Self::ExcludedFromNotice => "Excluded from Notice",
            Self::LowConfidence => "Low Confidence",
        }
    }

    /// The filter that cannot be active together with this one.
    #[must_use]
    pub const fn exclusive_with(&self) -> Option<Self> {
        match self {
            Self::OnlyFirstParty => Some(Self::HideFirstParty),
            Self::HideFirstParty => Some(Self::OnlyFirstParty),
            _ => None,
        }
    }

    /// Whether a record passes this filter.
    #[must_use]
    pub fn matches(&self, info: &PackageInfo, low_confidence_threshold: u32) -> bool {
        match self {
            Self::OnlyFollowUp => info.follow_up,
            Self::OnlyFirstParty => info.first_party,
            Self::HideFirstParty => !info.first_party,
            Self::OnlyNeedsReview => info.needs_review,
            Self::OnlyPreferred => info.preferred,
            Self::PreviouslyPreferred => info.was_preferred,
            Self::ExcludedFromNotice => info.exclude_from_notice,
            Self::LowConfidence => info
                .attribution_confidence
                .is_some_and(|confidence| confidence < low_confidence_threshold),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of active filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveFilters {
    filters: BTreeSet<Filter>,
}

impl ActiveFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a filter; activating one removes its exclusive counterpart.
    pub fn toggle(&mut self, filter: Filter) {
        if !self.filters.remove(&filter) {
            if let Some(other) = filter.exclusive_with() {
                self.filters.remove(&other);
            }
            self.filters.insert(filter);
        }
    }

    #[must_use]
    pub fn is_active(&self, filter: Filter) -> bool {
        self.filters.contains(&filter)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Filter> + '_ {
        self.filters.iter().copied()
    }

    /// Whether a record passes every active filter.
    #[must_use]
    pub fn matches(&self, info: &PackageInfo, low_confidence_threshold: u32) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.matches(info, low_confidence_threshold))
    }
}

impl FromIterator<Filter> for ActiveFilters {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        let mut filters = Self::new();
        for filter in iter {
            if !filters.is_active(filter) {
                filters.toggle(filter);
            }
        }
        filters
    }
}

/// Keep only the records passing every active filter.
#[must_use]
pub fn filter_attributions(
    attributions: &Attributions,
    filters: &ActiveFilters,
    low_confidence_threshold: u32,
) -> Attributions {
    attributions
        .iter()
        .filter(|(_, info)| filters.matches(info, low_confidence_threshold))
        .map(|(id, info)| (id.clone(), info.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributions() -> Attributions {
        let records = [
            PackageInfo {
                id: "fp".to_string(),
                first_party: true,
                ..Default::default()
            },
            PackageInfo {
                id: "fu".to_string(),
                follow_up: true,
                attribution_confidence: Some(20),
                ..Default::default()
            },
            PackageInfo {
                id: "both".to_string(),
                follow_up: true,
                needs_review: true,
                attribution_confidence: Some(90),
                ..Default::default()
            },
        ];
        records.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    fn ids(attributions: &Attributions) -> Vec<&str> {
        attributions.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_first_party_filters_are_exclusive() {
        let mut filters = ActiveFilters::new();
        filters.toggle(Filter::OnlyFirstParty);
        filters.toggle(Filter::HideFirstParty);
        assert!(filters.is_active(Filter::HideFirstParty));
        assert!(!filters.is_active(Filter::OnlyFirstParty));

        filters.toggle(Filter::HideFirstParty);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_filters_intersect() {
        let filters: ActiveFilters = [Filter::OnlyFollowUp, Filter::OnlyNeedsReview]
            .into_iter()
            .collect();
        assert_eq!(ids(&filter_attributions(&attributions(), &filters, 60)), vec!["both"]);
    }

    #[test]
    fn test_hide_first_party_and_low_confidence() {
        let filters: ActiveFilters = [Filter::HideFirstParty].into_iter().collect();
        assert_eq!(
            ids(&filter_attributions(&attributions(), &filters, 60)),
            vec!["fu", "both"]
        );

        let filters: ActiveFilters = [Filter::LowConfidence].into_iter().collect();
        assert_eq!(ids(&filter_attributions(&attributions(), &filters, 60)), vec!["fu"]);
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let all = filter_attributions(&attributions(), &ActiveFilters::new(), 60);
        assert_eq!(all.len(), 3);
    }
}

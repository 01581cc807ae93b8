//! Editable projection of one or more attribution records.
//!
//! Conversions in both directions destructure every field without `..`, so
//! adding a field to [`PackageInfo`] or [`DisplayPackageInfo`] fails to compile
//! until the mapping below is updated.

use super::package_info::{AttributionId, Criticality, PackageInfo, Source};
use serde::{Deserialize, Serialize};

/// UI-facing attribution: `comment` becomes `comments`, and the ids of all
/// merged records are kept in `attribution_ids` (empty for a new attribution).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayPackageInfo {
    pub attribution_ids: Vec<AttributionId>,
    pub comments: Vec<String>,
    pub attribution_confidence: Option<u32>,
    pub copyright: Option<String>,
    pub criticality: Criticality,
    pub exclude_from_notice: bool,
    pub first_party: bool,
    pub follow_up: bool,
    pub license_name: Option<String>,
    pub license_text: Option<String>,
    pub needs_review: bool,
    pub origin_ids: Vec<AttributionId>,
    pub package_name: Option<String>,
    pub package_namespace: Option<String>,
    #[serde(rename = "packagePURLAppendix")]
    pub package_purl_appendix: Option<String>,
    pub package_type: Option<String>,
    pub package_version: Option<String>,
    pub pre_selected: bool,
    pub preferred: bool,
    pub preferred_over_origin_ids: Vec<AttributionId>,
    pub source: Option<Source>,
    pub url: Option<String>,
    pub was_preferred: bool,
}

impl From<PackageInfo> for DisplayPackageInfo {
    fn from(info: PackageInfo) -> Self {
        let PackageInfo {
            id,
            attribution_confidence,
            comment,
            copyright,
            criticality,
            exclude_from_notice,
            first_party,
            follow_up,
            license_name,
            license_text,
            needs_review,
            origin_ids,
            package_name,
            package_namespace,
            package_purl_appendix,
            package_type,
            package_version,
            pre_selected,
            preferred,
            preferred_over_origin_ids,
            source,
            url,
            was_preferred,
        } = info;

        Self {
            attribution_ids: if id.is_empty() { Vec::new() } else { vec![id] },
            comments: comment.into_iter().collect(),
            attribution_confidence,
            copyright,
            criticality,
            exclude_from_notice,
            first_party,
            follow_up,
            license_name,
            license_text,
            needs_review,
            origin_ids,
            package_name,
            package_namespace,
            package_purl_appendix,
            package_type,
            package_version,
            pre_selected,
            preferred,
            preferred_over_origin_ids,
            source,
            url,
            was_preferred,
        }
    }
}

impl From<&PackageInfo> for DisplayPackageInfo {
    fn from(info: &PackageInfo) -> Self {
        Self::from(info.clone())
    }
}

impl From<DisplayPackageInfo> for PackageInfo {
    /// The first attribution id becomes the record id. A single comment maps
    /// back to `comment`; merged comments cannot be represented and are dropped.
    fn from(display: DisplayPackageInfo) -> Self {
        let DisplayPackageInfo {
            attribution_ids,
            comments,
            attribution_confidence,
            copyright,
            criticality,
            exclude_from_notice,
            first_party,
            follow_up,
            license_name,
            license_text,
            needs_review,
            origin_ids,
            package_name,
            package_namespace,
            package_purl_appendix,
            package_type,
            package_version,
            pre_selected,
            preferred,
            preferred_over_origin_ids,
            source,
            url,
            was_preferred,
        } = display;

        let comment = match <[String; 1]>::try_from(comments) {
            Ok([single]) => Some(single),
            Err(_) => None,
        };

        Self {
            id: attribution_ids.into_iter().next().unwrap_or_default(),
            attribution_confidence,
            comment,
            copyright,
            criticality,
            exclude_from_notice,
            first_party,
            follow_up,
            license_name,
            license_text,
            needs_review,
            origin_ids,
            package_name,
            package_namespace,
            package_purl_appendix,
            package_type,
            package_version,
            pre_selected,
            preferred,
            preferred_over_origin_ids,
            source,
            url,
            was_preferred,
        }
    }
}

impl DisplayPackageInfo {
    /// The empty sentinel used when nothing is selected.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge several records into one card.
    ///
    /// Fields come from the first record; comments and ids are collected
    /// from all of them in order. Empty comments are skipped when more than
    /// one record is merged.
    #[must_use]
    pub fn merged<'a, I>(infos: I) -> Self
    where
        I: IntoIterator<Item = &'a PackageInfo>,
    {
        let mut iter = infos.into_iter();
        let Some(first) = iter.next() else {
            return Self::empty();
        };
        let mut merged = Self::from(first);
        let mut rest = iter.peekable();
        if rest.peek().is_some() {
            merged.comments.retain(|c| !c.is_empty());
        }
        for info in rest {
            if !info.id.is_empty() {
                merged.attribution_ids.push(info.id.clone());
            }
            if let Some(comment) = info.comment.as_ref().filter(|c| !c.is_empty()) {
                merged.comments.push(comment.clone());
            }
        }
        merged
    }

    /// Convert to a record, cloning.
    #[must_use]
    pub fn to_package_info(&self) -> PackageInfo {
        PackageInfo::from(self.clone())
    }

    /// Stripped record form used by the unsaved-changes check.
    #[must_use]
    pub fn stripped(&self) -> PackageInfo {
        self.to_package_info().stripped()
    }

    /// Whether this is a new, not yet saved attribution.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.attribution_ids.is_empty()
    }

    /// Whether both describe the same content, ignoring ids. Empty comments
    /// count as absent.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        let written = |info: &Self| {
            info.comments
                .iter()
                .filter(|c| !c.is_empty())
                .cloned()
                .collect::<Vec<_>>()
        };
        written(self) == written(other) && self.stripped() == other.stripped()
    }
}

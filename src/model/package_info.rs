//! Attribution records.
//!
//! A [`PackageInfo`] describes one package found on (or attached to) resources:
//! its identity, license, copyright and curation flags. Two records are
//! considered the same attribution when their [`stripped`](PackageInfo::stripped)
//! forms are equal.

use packageurl::PackageUrl;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable identifier of an attribution within one dataset.
pub type AttributionId = String;

/// How critical a signal is for the audit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    #[default]
    None,
    Medium,
    High,
}

impl Criticality {
    /// Whether this is the default (no criticality).
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Provenance of an external attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Name of the scanner or source that produced the signal
    pub name: String,
    /// Confidence (0-100) the source has in its document
    #[serde(default)]
    pub document_confidence: u32,
    /// Original source name when the signal was forwarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_name: Option<String>,
}

/// One attribution record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: AttributionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution_confidence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Criticality::is_none")]
    pub criticality: Criticality,
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_from_notice: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub first_party: bool,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "deserialize_follow_up")]
    pub follow_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_text: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub needs_review: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origin_ids: Vec<AttributionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_namespace: Option<String>,
    #[serde(rename = "packagePURLAppendix", skip_serializing_if = "Option::is_none")]
    pub package_purl_appendix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub pre_selected: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub preferred: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preferred_over_origin_ids: Vec<AttributionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub was_preferred: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// Accepts both `true`/`false` and the legacy `"FOLLOW_UP"` marker.
fn deserialize_follow_up<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FollowUp {
        Flag(bool),
        Marker(String),
    }

    Ok(match FollowUp::deserialize(deserializer)? {
        FollowUp::Flag(flag) => flag,
        FollowUp::Marker(marker) => marker == "FOLLOW_UP",
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl PackageInfo {
    /// Normalized form used for equality checks and deduplication.
    ///
    /// Drops the id, criticality, pre-selection and origin ids, turns blank
    /// strings into `None`, and for first-party records also drops copyright
    /// and license fields.
    #[must_use]
    pub fn stripped(&self) -> Self {
        let mut stripped = Self {
            id: AttributionId::new(),
            criticality: Criticality::None,
            pre_selected: false,
            origin_ids: Vec::new(),
            comment: non_empty(self.comment.clone()),
            copyright: non_empty(self.copyright.clone()),
            license_name: non_empty(self.license_name.clone()),
            license_text: non_empty(self.license_text.clone()),
            package_name: non_empty(self.package_name.clone()),
            package_namespace: non_empty(self.package_namespace.clone()),
            package_purl_appendix: non_empty(self.package_purl_appendix.clone()),
            package_type: non_empty(self.package_type.clone()),
            package_version: non_empty(self.package_version.clone()),
            url: non_empty(self.url.clone()),
            ..self.clone()
        };
        if stripped.first_party {
            stripped.copyright = None;
            stripped.license_name = None;
            stripped.license_text = None;
        }
        stripped
    }

    /// Whether nothing meaningful remains after stripping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stripped() == Self::default()
    }

    /// Whether two records describe the same attribution.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.stripped() == other.stripped()
    }

    /// Render the package identity as a Package URL.
    ///
    /// Requires a package type and name; the PURL appendix (qualifiers or
    /// subpath) is appended verbatim.
    #[must_use]
    pub fn purl(&self) -> Option<String> {
        let package_type = self.package_type.as_deref().filter(|t| !t.is_empty())?;
        let name = self.package_name.as_deref().filter(|n| !n.is_empty())?;

        let mut purl = PackageUrl::new(package_type, name).ok()?;
        if let Some(namespace) = self.package_namespace.as_deref().filter(|n| !n.is_empty()) {
            purl.with_namespace(namespace);
        }
        if let Some(version) = self.package_version.as_deref().filter(|v| !v.is_empty()) {
            purl.with_version(version);
        }

        let mut rendered = purl.to_string();
        if let Some(appendix) = &self.package_purl_appendix {
            rendered.push_str(appendix);
        }
        Some(rendered)
    }

    /// Short label for logs and text output.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.package_name, &self.package_version) {
            (Some(name), Some(version)) => format!("{name}@{version}"),
            (Some(name), None) => name.clone(),
            _ => self
                .license_name
                .clone()
                .unwrap_or_else(|| format!("<{}>", self.id)),
        }
    }
}

//! Create/update/delete resolution for manual attributions.
//!
//! Saving never mints a second record with the same stripped content: an
//! existing, confirmed (not pre-selected) record with equal content is reused.

use crate::model::{AttributionData, AttributionId, Criticality, PackageInfo};
use uuid::Uuid;

/// What a save resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOperation {
    /// The attribution was removed everywhere
    Delete { attribution_id: AttributionId },
    /// Resources of `from` now point at the existing `to`
    Replace { from: AttributionId, to: AttributionId },
    /// The resource was linked to an existing attribution
    Link { attribution_id: AttributionId },
    /// A new attribution was minted and linked
    Create { attribution_id: AttributionId },
    /// The record was overwritten in place
    Update { attribution_id: AttributionId },
    /// Nothing to do
    Noop,
}

impl SaveOperation {
    /// Id the saved content lives under afterwards, if any.
    #[must_use]
    pub fn resulting_id(&self) -> Option<&AttributionId> {
        match self {
            Self::Replace { to, .. } => Some(to),
            Self::Link { attribution_id }
            | Self::Create { attribution_id }
            | Self::Update { attribution_id } => Some(attribution_id),
            Self::Delete { .. } | Self::Noop => None,
        }
    }

    /// Whether the store changed.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Noop)
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
            Self::Link { .. } => "link",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Noop => "noop",
        }
    }
}

/// Find a confirmed manual attribution with the same stripped content.
#[must_use]
pub fn find_matching_attribution(
    data: &AttributionData,
    package_info: &PackageInfo,
    exclude_id: Option<&str>,
) -> Option<AttributionId> {
    let fingerprint = package_info.stripped();
    data.attributions()
        .iter()
        .filter(|(id, _)| Some(id.as_str()) != exclude_id)
        .filter(|(_, candidate)| !candidate.pre_selected)
        .find(|(_, candidate)| candidate.stripped() == fingerprint)
        .map(|(id, _)| id.clone())
}

/// Mint a fresh attribution id.
#[must_use]
pub fn new_attribution_id() -> AttributionId {
    Uuid::new_v4().to_string()
}

/// Record as it is persisted: keyed by `id`, confirmed by the user.
fn persisted_record(package_info: &PackageInfo, id: &str) -> PackageInfo {
    PackageInfo {
        id: id.to_string(),
        pre_selected: false,
        ..package_info.clone()
    }
}

/// Resolve and apply a save.
///
/// 1. an existing attribution saved empty is deleted
/// 2. an existing attribution matching another record is replaced by it
/// 3. a new attribution matching a record links the resource to it
/// 4. a new attribution is created and linked
/// 5. otherwise the record is updated in place
pub fn save_package_info(
    data: &mut AttributionData,
    resource_id: Option<&str>,
    attribution_id: Option<&str>,
    package_info: &PackageInfo,
) -> SaveOperation {
    if let Some(id) = attribution_id
        && !data.contains(id)
    {
        tracing::warn!(attribution_id = %id, "Ignoring save for unknown attribution");
        return SaveOperation::Noop;
    }

    if package_info.is_empty() {
        return match attribution_id {
            Some(id) => {
                data.remove(id);
                SaveOperation::Delete {
                    attribution_id: id.to_string(),
                }
            }
            None => SaveOperation::Noop,
        };
    }

    let matching = find_matching_attribution(data, package_info, attribution_id);

    match (resource_id, attribution_id, matching) {
        (_, Some(old), Some(existing)) => {
            data.replace(old, &existing);
            SaveOperation::Replace {
                from: old.to_string(),
                to: existing,
            }
        }
        (Some(resource), None, Some(existing)) => {
            data.link(resource, &existing);
            SaveOperation::Link {
                attribution_id: existing,
            }
        }
        (Some(resource), None, None) => {
            let id = new_attribution_id();
            data.upsert(persisted_record(package_info, &id));
            data.link(resource, &id);
            SaveOperation::Create { attribution_id: id }
        }
        (_, Some(id), None) => {
            data.upsert(persisted_record(package_info, id));
            SaveOperation::Update {
                attribution_id: id.to_string(),
            }
        }
        (None, None, _) => {
            tracing::debug!("Save without resource or attribution id");
            SaveOperation::Noop
        }
    }
}

/// Detach one resource from an attribution and save the edit for it alone.
///
/// Siblings keep the original record.
pub fn unlink_and_save_package_info(
    data: &mut AttributionData,
    resource_id: &str,
    attribution_id: &str,
    package_info: &PackageInfo,
) -> SaveOperation {
    data.unlink(resource_id, attribution_id);
    let operation = save_package_info(data, Some(resource_id), None, package_info);
    let still_used = operation.resulting_id().map(String::as_str) == Some(attribution_id);
    if !still_used && data.resources_of(attribution_id).is_empty() {
        data.remove(attribution_id);
    }
    operation
}

/// Save an edit made while looking at one resource.
///
/// Shared attributions go through [`unlink_and_save_package_info`] unless
/// `globally` is set.
pub fn save_for_resource(
    data: &mut AttributionData,
    resource_id: &str,
    attribution_id: Option<&str>,
    package_info: &PackageInfo,
    globally: bool,
) -> SaveOperation {
    match attribution_id {
        Some(id) if !globally && data.resources_of(id).len() > 1 => {
            unlink_and_save_package_info(data, resource_id, id, package_info)
        }
        _ => save_package_info(data, Some(resource_id), attribution_id, package_info),
    }
}

/// Remove an attribution from one resource; drop the record once orphaned.
pub fn delete_attribution_on_resource(
    data: &mut AttributionData,
    resource_id: &str,
    attribution_id: &str,
) -> SaveOperation {
    if !data.unlink(resource_id, attribution_id) {
        return SaveOperation::Noop;
    }
    if data.resources_of(attribution_id).is_empty() {
        data.remove(attribution_id);
    }
    SaveOperation::Delete {
        attribution_id: attribution_id.to_string(),
    }
}

/// Attach a signal to a resource as a manual attribution.
///
/// The signal's id is recorded in `origin_ids` and its criticality is
/// dropped; an equal existing record is reused.
pub fn add_signal_to_resource(
    data: &mut AttributionData,
    resource_id: &str,
    signal: &PackageInfo,
) -> SaveOperation {
    let mut package_info = signal.clone();
    package_info.origin_ids = if signal.id.is_empty() {
        Vec::new()
    } else {
        vec![signal.id.clone()]
    };
    package_info.id = AttributionId::new();
    package_info.criticality = Criticality::None;
    package_info.pre_selected = false;
    save_package_info(data, Some(resource_id), None, &package_info)
}

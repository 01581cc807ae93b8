//! Content hashes used to merge identical signals into one card.

use crate::model::{AttributionId, Attributions, PackageInfo};
use crate::utils::content_hash_hex;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Hash of a signal's content, ignoring its comment.
///
/// Returns `None` when nothing but ids and volatile flags remain: such
/// records are never merged.
#[must_use]
pub fn attribution_hash(info: &PackageInfo) -> Option<String> {
    let mut stripped = info.stripped();
    stripped.comment = None;
    if stripped == PackageInfo::default() {
        return None;
    }
    let bytes = serde_json::to_vec(&stripped).ok()?;
    Some(content_hash_hex(&bytes))
}

/// Hash every external attribution that has content.
#[must_use]
pub fn compute_attributions_to_hashes(attributions: &Attributions) -> HashMap<AttributionId, String> {
    attributions
        .iter()
        .filter_map(|(id, info)| attribution_hash(info).map(|hash| (id.clone(), hash)))
        .collect()
}

/// Group ids sharing a hash, keeping first-seen order.
///
/// Ids without a hash form singleton groups.
#[must_use]
pub fn group_by_hash<'a>(
    attribution_ids: &'a [AttributionId],
    attributions_to_hashes: &HashMap<AttributionId, String>,
) -> Vec<Vec<&'a AttributionId>> {
    let mut groups: IndexMap<GroupKey<'_>, Vec<&'a AttributionId>> = IndexMap::new();
    for id in attribution_ids {
        let key = attributions_to_hashes
            .get(id)
            .map_or(GroupKey::Unique(id), |hash| GroupKey::Hash(hash));
        groups.entry(key).or_default().push(id);
    }
    groups.into_values().collect()
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Hash(&'a str),
    Unique(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(id: &str, name: &str, comment: Option<&str>) -> PackageInfo {
        PackageInfo {
            id: id.to_string(),
            package_name: Some(name.to_string()),
            comment: comment.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_hash_ignores_comment_and_id() {
        let a = signal("a", "lodash", Some("from scanner A"));
        let b = signal("b", "lodash", None);
        assert_eq!(attribution_hash(&a), attribution_hash(&b));
        assert_ne!(attribution_hash(&a), attribution_hash(&signal("c", "react", None)));
    }

    #[test]
    fn test_empty_content_has_no_hash() {
        let empty = PackageInfo {
            id: "x".to_string(),
            comment: Some("only a comment".to_string()),
            ..Default::default()
        };
        assert!(attribution_hash(&empty).is_none());
    }

    #[test]
    fn test_group_by_hash() {
        let ids: Vec<AttributionId> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let hashes: HashMap<AttributionId, String> = [
            ("a".to_string(), "h1".to_string()),
            ("c".to_string(), "h1".to_string()),
        ]
        .into_iter()
        .collect();

        let groups = group_by_hash(&ids, &hashes);
        let groups: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| g.iter().map(|id| id.as_str()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["a", "c"], vec!["b"], vec!["d"]]);
    }
}

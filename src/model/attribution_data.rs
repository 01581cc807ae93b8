//! Attribution dataset with bidirectional resource indexes.
//!
//! [`AttributionData`] keeps `resources_to_attributions` and
//! `attributions_to_resources` mirror images of each other: a pair
//! `(resource, attribution)` is present in one iff it is present in the other.
//! Empty lists are never stored.
//!
//! The folder rollup index ([`ResourcesWithAttributedChildren`]) maps every
//! ancestor of an attributed resource to the attributed resources below it.
//! Paths are interned into an append-only table so the sets hold integers.

use super::package_info::{AttributionId, PackageInfo};
use super::resources::{ResourceId, get_parents};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};

/// Attribution records by id.
pub type Attributions = IndexMap<AttributionId, PackageInfo>;
/// Attribution ids linked to each resource, in link order.
pub type ResourcesToAttributions = IndexMap<ResourceId, Vec<AttributionId>>;
/// Resources linked to each attribution, in link order.
pub type AttributionsToResources = IndexMap<AttributionId, Vec<ResourceId>>;

/// Append-only table assigning stable integer ids to resource paths.
#[derive(Debug, Clone, Default)]
pub struct PathInterner {
    paths: Vec<ResourceId>,
    ids: HashMap<ResourceId, usize>,
}

impl PathInterner {
    /// Id of a path, interning it on first use.
    pub fn intern(&mut self, path: &str) -> usize {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = self.paths.len();
        self.paths.push(path.to_string());
        self.ids.insert(path.to_string(), id);
        id
    }

    /// Id of an already interned path.
    #[must_use]
    pub fn id_of(&self, path: &str) -> Option<usize> {
        self.ids.get(path).copied()
    }

    /// Path for an id.
    #[must_use]
    pub fn path(&self, id: usize) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    /// Number of interned paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// For each ancestor of an attributed resource, the attributed resources below it.
#[derive(Debug, Clone, Default)]
pub struct ResourcesWithAttributedChildren {
    interner: PathInterner,
    attributed_children: HashMap<usize, BTreeSet<usize>>,
}

impl ResourcesWithAttributedChildren {
    /// Build the index from scratch.
    #[must_use]
    pub fn build(resources_to_attributions: &ResourcesToAttributions) -> Self {
        let mut index = Self::default();
        index.rebuild(resources_to_attributions);
        index
    }

    /// Recompute every set. Interned ids stay stable across rebuilds.
    pub fn rebuild(&mut self, resources_to_attributions: &ResourcesToAttributions) {
        self.attributed_children.clear();
        for (resource_id, attribution_ids) in resources_to_attributions {
            if attribution_ids.is_empty() {
                continue;
            }
            let child = self.interner.intern(resource_id);
            for parent in get_parents(resource_id) {
                let parent = self.interner.intern(&parent);
                self.attributed_children
                    .entry(parent)
                    .or_default()
                    .insert(child);
            }
        }
    }

    /// Attributed descendants of a resource, in interning order.
    pub fn children_of<'a>(&'a self, resource_id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.interner
            .id_of(resource_id)
            .and_then(|id| self.attributed_children.get(&id))
            .into_iter()
            .flatten()
            .filter_map(|&child| self.interner.path(child))
    }

    /// Whether any descendant of the resource is attributed.
    #[must_use]
    pub fn has_attributed_children(&self, resource_id: &str) -> bool {
        self.interner
            .id_of(resource_id)
            .and_then(|id| self.attributed_children.get(&id))
            .is_some_and(|set| !set.is_empty())
    }

    /// Number of resources with at least one attributed descendant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributed_children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributed_children.is_empty()
    }

    /// The interning table backing this index.
    #[must_use]
    pub const fn interner(&self) -> &PathInterner {
        &self.interner
    }
}

/// One attribution dataset (manual or external).
#[derive(Debug, Clone, Default)]
pub struct AttributionData {
    attributions: Attributions,
    resources_to_attributions: ResourcesToAttributions,
    attributions_to_resources: AttributionsToResources,
    resources_with_attributed_children: ResourcesWithAttributedChildren,
}

impl AttributionData {
    /// Build a dataset from records and resource links.
    ///
    /// Duplicate links are collapsed and links to unknown attributions are
    /// dropped, so the result always satisfies the index invariant.
    #[must_use]
    pub fn new(attributions: Attributions, resources_to_attributions: ResourcesToAttributions) -> Self {
        let mut attributions = attributions;
        for (id, info) in &mut attributions {
            if info.id != *id {
                info.id.clone_from(id);
            }
        }

        let mut data = Self {
            attributions,
            ..Self::default()
        };
        for (resource_id, attribution_ids) in resources_to_attributions {
            for attribution_id in attribution_ids {
                if !data.link_inner(&resource_id, &attribution_id) {
                    tracing::debug!(
                        resource_id = %resource_id,
                        attribution_id = %attribution_id,
                        "Dropping duplicate or dangling link"
                    );
                }
            }
        }
        data.refresh_attributed_children();
        data
    }

    /// All attribution records.
    #[must_use]
    pub const fn attributions(&self) -> &Attributions {
        &self.attributions
    }

    /// Look up one record.
    #[must_use]
    pub fn get(&self, attribution_id: &str) -> Option<&PackageInfo> {
        self.attributions.get(attribution_id)
    }

    /// Whether a record exists.
    #[must_use]
    pub fn contains(&self, attribution_id: &str) -> bool {
        self.attributions.contains_key(attribution_id)
    }

    #[must_use]
    pub const fn resources_to_attributions(&self) -> &ResourcesToAttributions {
        &self.resources_to_attributions
    }

    #[must_use]
    pub const fn attributions_to_resources(&self) -> &AttributionsToResources {
        &self.attributions_to_resources
    }

    #[must_use]
    pub const fn resources_with_attributed_children(&self) -> &ResourcesWithAttributedChildren {
        &self.resources_with_attributed_children
    }

    /// Attribution ids linked to a resource.
    #[must_use]
    pub fn attribution_ids_of(&self, resource_id: &str) -> &[AttributionId] {
        self.resources_to_attributions
            .get(resource_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Resources linked to an attribution.
    #[must_use]
    pub fn resources_of(&self, attribution_id: &str) -> &[ResourceId] {
        self.attributions_to_resources
            .get(attribution_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether the pair is linked.
    #[must_use]
    pub fn is_linked(&self, resource_id: &str, attribution_id: &str) -> bool {
        self.attribution_ids_of(resource_id)
            .iter()
            .any(|id| id == attribution_id)
    }

    /// Insert or overwrite a record. The record's `id` is the key.
    pub fn upsert(&mut self, info: PackageInfo) {
        self.attributions.insert(info.id.clone(), info);
    }

    /// Link a resource to an attribution.
    ///
    /// No-op (returning `false`) when already linked or when the record does
    /// not exist.
    pub fn link(&mut self, resource_id: &str, attribution_id: &str) -> bool {
        let had_attributions = !self.attribution_ids_of(resource_id).is_empty();
        let linked = self.link_inner(resource_id, attribution_id);
        if linked && !had_attributions {
            self.refresh_attributed_children();
        }
        linked
    }

    /// Unlink a resource from an attribution. The record itself is kept.
    ///
    /// Unlinking a pair that is not linked is a no-op returning `false`.
    pub fn unlink(&mut self, resource_id: &str, attribution_id: &str) -> bool {
        let unlinked = self.unlink_inner(resource_id, attribution_id);
        if unlinked && self.attribution_ids_of(resource_id).is_empty() {
            self.refresh_attributed_children();
        }
        unlinked
    }

    /// Remove a record and every link to it.
    pub fn remove(&mut self, attribution_id: &str) -> Option<PackageInfo> {
        let resources = self
            .attributions_to_resources
            .get(attribution_id)
            .cloned()
            .unwrap_or_default();
        for resource_id in &resources {
            self.unlink_inner(resource_id, attribution_id);
        }
        if !resources.is_empty() {
            self.refresh_attributed_children();
        }
        self.attributions.shift_remove(attribution_id)
    }

    /// Repoint every resource linked to `old_id` onto `new_id` and drop `old_id`.
    pub fn replace(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id || !self.contains(new_id) {
            return;
        }
        let resources = self.resources_of(old_id).to_vec();
        for resource_id in &resources {
            self.unlink_inner(resource_id, old_id);
            self.link_inner(resource_id, new_id);
        }
        self.attributions.shift_remove(old_id);
        self.refresh_attributed_children();
    }

    /// Verify that both indexes mirror each other and hold no empty lists.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.resources_to_attributions.iter().all(|(resource, ids)| {
            !ids.is_empty()
                && ids.iter().all(|id| {
                    self.resources_of(id).iter().filter(|r| *r == resource).count() == 1
                })
        });
        let backward_ok = self.attributions_to_resources.iter().all(|(id, resources)| {
            !resources.is_empty()
                && resources.iter().all(|resource| {
                    self.attribution_ids_of(resource)
                        .iter()
                        .filter(|a| *a == id)
                        .count()
                        == 1
                })
        });
        forward_ok && backward_ok
    }

    fn link_inner(&mut self, resource_id: &str, attribution_id: &str) -> bool {
        if !self.attributions.contains_key(attribution_id) {
            tracing::warn!(
                resource_id = %resource_id,
                attribution_id = %attribution_id,
                "Ignoring link to unknown attribution"
            );
            return false;
        }
        let ids = self
            .resources_to_attributions
            .entry(resource_id.to_string())
            .or_default();
        if ids.iter().any(|id| id == attribution_id) {
            return false;
        }
        ids.push(attribution_id.to_string());
        self.attributions_to_resources
            .entry(attribution_id.to_string())
            .or_default()
            .push(resource_id.to_string());
        true
    }

    fn unlink_inner(&mut self, resource_id: &str, attribution_id: &str) -> bool {
        let Some(ids) = self.resources_to_attributions.get_mut(resource_id) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|id| id == attribution_id) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.resources_to_attributions.shift_remove(resource_id);
        }

        if let Some(resources) = self.attributions_to_resources.get_mut(attribution_id) {
            resources.retain(|r| r != resource_id);
            if resources.is_empty() {
                self.attributions_to_resources.shift_remove(attribution_id);
            }
        }
        true
    }

    fn refresh_attributed_children(&mut self) {
        self.resources_with_attributed_children
            .rebuild(&self.resources_to_attributions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, name: &str) -> (AttributionId, PackageInfo) {
        (
            id.to_string(),
            PackageInfo {
                id: id.to_string(),
                package_name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    fn sample() -> AttributionData {
        let attributions: Attributions =
            [record("u1", "react"), record("u2", "vue")].into_iter().collect();
        let links: ResourcesToAttributions = [
            ("/a/b.js".to_string(), vec!["u1".to_string(), "u1".to_string()]),
            ("/a/c/".to_string(), vec!["u2".to_string(), "ghost".to_string()]),
        ]
        .into_iter()
        .collect();
        AttributionData::new(attributions, links)
    }

    #[test]
    fn test_new_collapses_duplicates_and_drops_dangling() {
        let data = sample();
        assert_eq!(data.attribution_ids_of("/a/b.js"), ["u1"]);
        assert_eq!(data.attribution_ids_of("/a/c/"), ["u2"]);
        assert_eq!(data.resources_of("u1"), ["/a/b.js"]);
        assert!(data.is_consistent());
    }

    #[test]
    fn test_link_updates_both_directions_and_rollup() {
        let mut data = sample();
        assert!(data.link("/d.js", "u1"));
        assert!(!data.link("/d.js", "u1"));
        assert_eq!(data.resources_of("u1"), ["/a/b.js", "/d.js"]);
        assert!(data.is_consistent());

        let root_children: Vec<&str> = data
            .resources_with_attributed_children()
            .children_of("/")
            .collect();
        assert!(root_children.contains(&"/d.js"));
        assert!(root_children.contains(&"/a/b.js"));
    }

    #[test]
    fn test_unlink_keeps_record_and_cleans_rollup() {
        let mut data = sample();
        assert!(data.unlink("/a/c/", "u2"));
        assert!(!data.unlink("/a/c/", "u2"));
        assert!(data.contains("u2"));
        assert!(data.resources_of("u2").is_empty());
        assert!(data.is_consistent());

        let a_children: Vec<&str> = data
            .resources_with_attributed_children()
            .children_of("/a/")
            .collect();
        assert_eq!(a_children, vec!["/a/b.js"]);
    }

    #[test]
    fn test_remove_and_replace() {
        let mut data = sample();
        data.link("/a/c/", "u1");
        data.replace("u2", "u1");
        assert!(!data.contains("u2"));
        assert_eq!(data.attribution_ids_of("/a/c/"), ["u1"]);
        assert!(data.is_consistent());

        data.remove("u1");
        assert!(data.resources_to_attributions().is_empty());
        assert!(data.resources_with_attributed_children().is_empty());
    }

    #[test]
    fn test_interner_is_append_only() {
        let mut data = sample();
        let before = data
            .resources_with_attributed_children()
            .interner()
            .id_of("/a/b.js");
        data.unlink("/a/b.js", "u1");
        data.link("/a/b.js", "u1");
        let after = data
            .resources_with_attributed_children()
            .interner()
            .id_of("/a/b.js");
        assert_eq!(before, after);
    }
}

//! Resource tree of a scanned project.
//!
//! Resources are nested maps from a path segment to either `1` (a file) or
//! another map (a folder). Resource ids are slash-delimited paths: folders end
//! with `/`, files do not, and the root is `/`.

use crate::error::{OpossumError, ResourceErrorKind, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Slash-delimited resource path, e.g. `/src/lib/` or `/src/main.rs`.
pub type ResourceId = String;

/// Path of the tree root.
pub const ROOT_PATH: &str = "/";

/// One node of the resource tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceNode {
    /// A file, serialized as `1`.
    File(u8),
    /// A folder with named children.
    Folder(Resources),
}

impl ResourceNode {
    /// Marker value used for files.
    pub const FILE: Self = Self::File(1);
}

/// A resolved node borrowed from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    File,
    Folder(&'a Resources),
}

/// Children of a folder (the root is a folder too).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources {
    children: IndexMap<String, ResourceNode>,
}

impl Resources {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a list of resource ids, creating intermediate folders.
    ///
    /// Ids ending in `/` become folders, all others files.
    #[must_use]
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::new();
        for path in paths {
            root.insert_path(path.as_ref());
        }
        root
    }

    /// Insert a single resource id, creating intermediate folders.
    pub fn insert_path(&mut self, path: &str) {
        let is_folder = path.ends_with('/');
        let segments: Vec<&str> = segments(path).collect();
        let Some((last, folders)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for segment in folders {
            let node = current
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| ResourceNode::Folder(Self::new()));
            if matches!(node, ResourceNode::File(_)) {
                *node = ResourceNode::Folder(Self::new());
            }
            let ResourceNode::Folder(folder) = node else {
                unreachable!("node was just turned into a folder");
            };
            current = folder;
        }

        let leaf = if is_folder {
            ResourceNode::Folder(Self::new())
        } else {
            ResourceNode::FILE
        };
        current.children.entry((*last).to_string()).or_insert(leaf);
    }

    /// Named children of this folder.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ResourceNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Whether this folder has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Resolve a resource id to its node.
    ///
    /// Folder ids must end with `/` and file ids must not; a mismatch is
    /// reported as `NotFound` just like a missing segment.
    pub fn resolve(&self, path: &str) -> Result<NodeRef<'_>> {
        if !path.starts_with('/') {
            return Err(OpossumError::Resource {
                context: format!("resolving {path}"),
                source: ResourceErrorKind::NotAbsolute(path.to_string()),
            });
        }

        let wants_folder = path.ends_with('/');
        let mut node = NodeRef::Folder(self);
        for segment in segments(path) {
            let NodeRef::Folder(folder) = node else {
                return Err(OpossumError::resource_not_found(path));
            };
            node = match folder.children.get(segment) {
                Some(ResourceNode::File(_)) => NodeRef::File,
                Some(ResourceNode::Folder(child)) => NodeRef::Folder(child),
                None => return Err(OpossumError::resource_not_found(path)),
            };
        }

        match (node, wants_folder) {
            (NodeRef::File, true) | (NodeRef::Folder(_), false) => {
                Err(OpossumError::resource_not_found(path))
            }
            _ => Ok(node),
        }
    }

    /// Whether a resource id resolves in this tree.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// All resource ids in depth-first order, root first.
    #[must_use]
    pub fn all_paths(&self) -> Vec<ResourceId> {
        let mut paths = vec![ROOT_PATH.to_string()];
        self.collect_paths(ROOT_PATH, &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<ResourceId>) {
        for (name, node) in &self.children {
            match node {
                ResourceNode::File(_) => out.push(format!("{prefix}{name}")),
                ResourceNode::Folder(folder) => {
                    let path = format!("{prefix}{name}/");
                    out.push(path.clone());
                    folder.collect_paths(&path, out);
                }
            }
        }
    }

    /// Number of files in the tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                ResourceNode::File(_) => 1,
                ResourceNode::Folder(folder) => folder.file_count(),
            })
            .sum()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Ancestor ids of a resource, root first. Derived from the string only.
///
/// `get_parents("/a/b/c")` is `["/", "/a/", "/a/b/"]`; the root has none.
#[must_use]
pub fn get_parents(path: &str) -> Vec<ResourceId> {
    let last = path.len().saturating_sub(1);
    path.char_indices()
        .filter(|&(idx, ch)| ch == '/' && idx < last)
        .map(|(idx, _)| path[..=idx].to_string())
        .collect()
}

/// Whether `ancestor` is a strict ancestor of `path`.
#[must_use]
pub fn is_ancestor_of(ancestor: &str, path: &str) -> bool {
    ancestor.ends_with('/') && path.len() > ancestor.len() && path.starts_with(ancestor)
}

/// Whether a resource can hold children in the audit view.
#[must_use]
pub fn is_resource_with_children(path: &str, files_with_children: &HashSet<ResourceId>) -> bool {
    path.ends_with('/') || files_with_children.contains(path)
}

/// Whether a resource is registered as a file that also has children.
#[must_use]
pub fn is_file_with_children(path: &str, files_with_children: &HashSet<ResourceId>) -> bool {
    files_with_children.contains(path)
}

/// Whether a resource is an attribution breakpoint.
#[must_use]
pub fn is_attribution_breakpoint(path: &str, breakpoints: &HashSet<ResourceId>) -> bool {
    breakpoints.contains(path)
}

/// Closest ancestor whose attributions a resource inherits.
///
/// Walks upwards from the direct parent; a breakpoint on the way stops the
/// walk and nothing is inherited.
pub fn closest_ancestor_with_attributions<F>(
    path: &str,
    breakpoints: &HashSet<ResourceId>,
    has_attributions: F,
) -> Option<ResourceId>
where
    F: Fn(&str) -> bool,
{
    for parent in get_parents(path).into_iter().rev() {
        if is_attribution_breakpoint(&parent, breakpoints) {
            return None;
        }
        if has_attributions(&parent) {
            return Some(parent);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Resources {
        Resources::from_paths(["/src/main.rs", "/src/lib/util.rs", "/README.md", "/vendor/"])
    }

    #[test]
    fn test_resolve_files_and_folders() {
        let tree = sample_tree();
        assert!(matches!(tree.resolve("/"), Ok(NodeRef::Folder(_))));
        assert!(matches!(tree.resolve("/src/"), Ok(NodeRef::Folder(_))));
        assert!(matches!(tree.resolve("/src/lib/util.rs"), Ok(NodeRef::File)));
        assert!(matches!(tree.resolve("/vendor/"), Ok(NodeRef::Folder(_))));
    }

    #[test]
    fn test_resolve_not_found() {
        let tree = sample_tree();
        let err = tree.resolve("/src/missing.rs").unwrap_err();
        assert!(matches!(
            err,
            OpossumError::Resource {
                source: ResourceErrorKind::NotFound(_),
                ..
            }
        ));
        // Folder addressed as a file and vice versa
        assert!(tree.resolve("/src").is_err());
        assert!(tree.resolve("/README.md/").is_err());
        assert!(tree.resolve("/README.md/x").is_err());
        assert!(tree.resolve("relative/path").is_err());
    }

    #[test]
    fn test_get_parents() {
        assert_eq!(get_parents("/a/b/c"), vec!["/", "/a/", "/a/b/"]);
        assert_eq!(get_parents("/a/b/"), vec!["/", "/a/"]);
        assert_eq!(get_parents("/a"), vec!["/"]);
        assert!(get_parents("/").is_empty());
    }

    #[test]
    fn test_is_resource_with_children() {
        let files_with_children: HashSet<ResourceId> =
            ["/package.json".to_string()].into_iter().collect();
        assert!(is_resource_with_children("/src/", &files_with_children));
        assert!(is_resource_with_children("/package.json", &files_with_children));
        assert!(!is_resource_with_children("/src/main.rs", &files_with_children));
    }

    #[test]
    fn test_all_paths_root_first() {
        let paths = sample_tree().all_paths();
        assert_eq!(paths[0], "/");
        assert!(paths.contains(&"/src/lib/".to_string()));
        assert!(paths.contains(&"/src/lib/util.rs".to_string()));
        assert_eq!(sample_tree().file_count(), 3);
    }

    #[test]
    fn test_closest_ancestor_with_attributions() {
        let attributed = ["/src/".to_string()];
        let has = |path: &str| attributed.iter().any(|p| p == path);

        let no_breakpoints = HashSet::new();
        assert_eq!(
            closest_ancestor_with_attributions("/src/lib/util.rs", &no_breakpoints, has),
            Some("/src/".to_string())
        );

        let breakpoints: HashSet<ResourceId> = ["/src/lib/".to_string()].into_iter().collect();
        assert_eq!(
            closest_ancestor_with_attributions("/src/lib/util.rs", &breakpoints, has),
            None
        );
    }

    #[test]
    fn test_deserialize_nested_map() {
        let json = r#"{"src": {"main.rs": 1}, "README.md": 1}"#;
        let tree: Resources = serde_json::from_str(json).unwrap();
        assert!(tree.contains("/src/main.rs"));
        assert!(tree.contains("/README.md"));
        assert_eq!(serde_json::to_value(&tree).unwrap()["src"]["main.rs"], 1);
    }

    #[test]
    fn test_is_ancestor_of() {
        assert!(is_ancestor_of("/", "/a"));
        assert!(is_ancestor_of("/a/", "/a/b/"));
        assert!(!is_ancestor_of("/a/", "/a/"));
        assert!(!is_ancestor_of("/a/b", "/a/b/c"));
    }
}

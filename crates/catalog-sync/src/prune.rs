//! Removes obsolete leaves from a catalog without leaving empty branches behind.

use crate::tree::{Catalog, KeyPath, Node};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Removes every path in `obsolete` from `catalog`.
///
/// Any branch left empty by a removal is removed as well, all the way up to
/// (but excluding) the root. Paths that are already gone are skipped. Returns
/// the number of nodes that were actually removed at their final segment.
pub fn prune(catalog: &mut Catalog, obsolete: &BTreeSet<KeyPath>) -> usize {
    obsolete
        .iter()
        .filter(|path| remove_path(catalog.entries_mut(), path.segments()))
        .count()
}

/// Removes the node at `segments` below `map`, then drops `map`'s child if the
/// removal emptied it.
fn remove_path(map: &mut IndexMap<String, Node>, segments: &[String]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return map.shift_remove(first).is_some();
    }

    let removed = match map.get_mut(first) {
        Some(Node::Branch(children)) => remove_path(children, rest),
        Some(Node::Leaf(_)) | None => false,
    };

    if removed && matches!(map.get(first), Some(Node::Branch(children)) if children.is_empty()) {
        map.shift_remove(first);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn catalog(value: Value) -> Catalog {
        Catalog::from_value(value).unwrap()
    }

    fn obsolete(paths: &[&str]) -> BTreeSet<KeyPath> {
        paths.iter().map(|p| KeyPath::parse(p)).collect()
    }

    fn pruned(value: Value, paths: &[&str]) -> (Value, usize) {
        let mut c = catalog(value);
        let removed = prune(&mut c, &obsolete(paths));
        (serde_json::to_value(&c).unwrap(), removed)
    }

    #[test]
    fn removes_leaf_and_keeps_non_empty_parent() {
        let (out, removed) = pruned(json!({ "a": { "b": "bonjour", "x": "old" } }), &["a.x"]);
        assert_eq!(out, json!({ "a": { "b": "bonjour" } }));
        assert_eq!(removed, 1);
    }

    #[test]
    fn removes_emptied_ancestors() {
        let (out, _) = pruned(
            json!({ "keep": "k", "a": { "b": { "c": { "d": "gone" } } } }),
            &["a.b.c.d"],
        );
        assert_eq!(out, json!({ "keep": "k" }));
    }

    #[test]
    fn stops_cleanup_at_first_non_empty_ancestor() {
        let (out, _) = pruned(
            json!({ "a": { "other": "o", "b": { "c": "gone" } } }),
            &["a.b.c"],
        );
        assert_eq!(out, json!({ "a": { "other": "o" } }));
    }

    #[test]
    fn sibling_paths_sharing_a_deleted_ancestor() {
        let (out, removed) = pruned(
            json!({ "a": { "b": { "x": "1", "y": "2" } }, "z": "keep" }),
            &["a.b.x", "a.b.y"],
        );
        assert_eq!(out, json!({ "z": "keep" }));
        assert_eq!(removed, 2);
    }

    #[test]
    fn missing_paths_are_skipped_silently() {
        let (out, removed) = pruned(json!({ "a": "x" }), &["nope.deeper", "a.b", "ghost"]);
        assert_eq!(out, json!({ "a": "x" }));
        assert_eq!(removed, 0);
    }

    #[test]
    fn root_survives_when_everything_is_removed() {
        let (out, _) = pruned(json!({ "a": { "b": "x" } }), &["a.b"]);
        assert_eq!(out, json!({}));
    }

    #[test]
    fn preserves_order_of_remaining_keys() {
        let mut c = catalog(json!({ "one": "1", "two": "2", "three": "3" }));
        prune(&mut c, &obsolete(&["two"]));
        let keys: Vec<&String> = c.entries().keys().collect();
        assert_eq!(keys, vec!["one", "three"]);
    }

    #[test]
    fn pre_existing_empty_branch_elsewhere_is_untouched() {
        let (out, _) = pruned(json!({ "empty": {}, "a": "x", "b": "y" }), &["a"]);
        assert_eq!(out, json!({ "empty": {}, "b": "y" }));
    }
}

//! Computes missing and obsolete keys between a source and a target catalog.

use crate::tree::{Catalog, KeyPath, Node, flatten};
use std::collections::BTreeSet;

/// Difference between a source catalog and a target catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogDiff {
    /// Entries present in the source but absent in the target, with their
    /// source values, in the source's nesting shape.
    pub missing: Catalog,
    /// Leaf paths present in the target but absent in the source.
    pub obsolete: BTreeSet<KeyPath>,
}

impl CatalogDiff {
    /// Whether the two catalogs already have the same key set.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.obsolete.is_empty()
    }

    /// Missing leaf paths, sorted.
    pub fn missing_paths(&self) -> Vec<KeyPath> {
        let mut paths: Vec<KeyPath> = flatten(&self.missing).into_keys().collect();
        paths.sort();
        paths
    }

    /// Obsolete leaf paths, sorted.
    pub fn obsolete_paths(&self) -> Vec<KeyPath> {
        self.obsolete.iter().cloned().collect()
    }
}

/// Diffs `source` against `target`.
pub fn diff(source: &Catalog, target: &Catalog) -> CatalogDiff {
    let source_leaves = flatten(source);
    let target_leaves = flatten(target);

    let mut missing = Catalog::new();
    for (path, value) in &source_leaves {
        if target_leaves.contains_key(path) {
            continue;
        }
        // Paths come from a well-formed tree, so sibling writes never collide.
        if let Err(conflict) = missing.insert_path(path, Node::Leaf((*value).clone())) {
            tracing::debug!("skipping {}: {}", path, conflict);
        }
    }

    let obsolete = target_leaves
        .into_keys()
        .filter(|path| !source_leaves.contains_key(path))
        .collect();

    CatalogDiff { missing, obsolete }
}

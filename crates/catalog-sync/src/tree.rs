//! Catalog tree model.
//!
//! A catalog is a mapping from keys to [`Node`]s. Branches hold further
//! mappings, leaves hold any non-object JSON value. Strings are the only leaves
//! that get translated; everything else is carried along unchanged.

use crate::error::ShapeConflict;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Separator used when a [`KeyPath`] is rendered or parsed.
pub const PATH_SEPARATOR: char = '.';

/// A single node of a catalog tree.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// A nested mapping of keys to nodes.
    Branch(IndexMap<String, Node>),
    /// A terminal value. Never a JSON object.
    Leaf(Value),
}

impl Node {
    /// Returns the string content when this node is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Node::Branch(_) => "branch",
            Node::Leaf(_) => "leaf",
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                Node::Branch(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            },
            other => Node::Leaf(other),
        }
    }
}

/// Location of a node inside a catalog, stored as its key segments.
///
/// Keeping the segments apart means a key that itself contains a `.` is never
/// confused with a nested path. The dotted form is only used for display.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Creates an empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parses a dotted path such as `menu.file.open`.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self(dotted.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    /// Returns a new path with `key` appended.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// The key segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The complete nested key tree for one language.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    root: IndexMap<String, Node>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match Node::from(value) {
            Node::Branch(root) => Some(Self { root }),
            Node::Leaf(_) => None,
        }
    }

    /// Top-level entries of the catalog.
    pub fn entries(&self) -> &IndexMap<String, Node> {
        &self.root
    }

    pub(crate) fn entries_mut(&mut self) -> &mut IndexMap<String, Node> {
        &mut self.root
    }

    /// Whether the catalog has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of leaves in the catalog.
    pub fn leaf_count(&self) -> usize {
        flatten(self).len()
    }

    /// Looks up the node at `path`.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Node> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = &self.root;
        for segment in parents {
            match current.get(segment)? {
                Node::Branch(children) => current = children,
                Node::Leaf(_) => return None,
            }
        }
        current.get(last)
    }

    /// Mutable lookup of the node at `path`.
    pub fn get_path_mut(&mut self, path: &KeyPath) -> Option<&mut Node> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = &mut self.root;
        for segment in parents {
            match current.get_mut(segment)? {
                Node::Branch(children) => current = children,
                Node::Leaf(_) => return None,
            }
        }
        current.get_mut(last)
    }

    /// Writes `node` at `path`, creating intermediate branches as needed.
    ///
    /// Fails when an ancestor already holds a leaf. An existing branch at the
    /// final segment is only replaced by another branch.
    pub fn insert_path(&mut self, path: &KeyPath, node: Node) -> Result<(), ShapeConflict> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(ShapeConflict {
                path: path.clone(),
                at: KeyPath::root(),
                found: "root",
            });
        };

        let mut current = &mut self.root;
        let mut walked = KeyPath::root();
        for segment in parents {
            walked = walked.child(segment);
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Node::Branch(IndexMap::new()));
            match entry {
                Node::Branch(children) => current = children,
                Node::Leaf(_) => {
                    return Err(ShapeConflict {
                        path: path.clone(),
                        at: walked,
                        found: "leaf",
                    });
                },
            }
        }

        if let (Some(Node::Branch(_)), Node::Leaf(_)) = (current.get(last), &node) {
            return Err(ShapeConflict {
                path: path.clone(),
                at: path.clone(),
                found: "branch",
            });
        }
        current.insert(last.clone(), node);
        Ok(())
    }

    /// Renders the catalog as pretty JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

impl From<IndexMap<String, Node>> for Catalog {
    fn from(root: IndexMap<String, Node>) -> Self {
        Self { root }
    }
}

/// Flattens a catalog into its leaves, keyed by path, in document order.
///
/// Arrays are leaves; they are never descended into. Empty branches produce
/// no entries.
pub fn flatten(catalog: &Catalog) -> IndexMap<KeyPath, &Value> {
    let mut out = IndexMap::new();
    flatten_into(&catalog.root, &KeyPath::root(), &mut out);
    out
}

fn flatten_into<'a>(
    map: &'a IndexMap<String, Node>,
    prefix: &KeyPath,
    out: &mut IndexMap<KeyPath, &'a Value>,
) {
    for (key, node) in map {
        let path = prefix.child(key);
        match node {
            Node::Branch(children) => flatten_into(children, &path, out),
            Node::Leaf(value) => {
                out.insert(path, value);
            },
        }
    }
}

/// Deep-merges `delta` into `target`.
///
/// Keys already present in `target` keep their value. A key that is a branch
/// on one side and a leaf on the other is a [`ShapeConflict`].
pub fn merge_missing(target: &mut Catalog, delta: &Catalog) -> Result<(), ShapeConflict> {
    merge_into(&mut target.root, &delta.root, &KeyPath::root())
}

fn merge_into(
    target: &mut IndexMap<String, Node>,
    delta: &IndexMap<String, Node>,
    prefix: &KeyPath,
) -> Result<(), ShapeConflict> {
    for (key, incoming) in delta {
        let path = prefix.child(key);
        let existing = match target.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming.clone());
                continue;
            },
            Entry::Occupied(slot) => slot.into_mut(),
        };
        match (existing, incoming) {
            (Node::Branch(existing), Node::Branch(children)) => {
                merge_into(existing, children, &path)?;
            },
            (Node::Leaf(_), Node::Leaf(_)) => {},
            (existing, _) => {
                return Err(ShapeConflict {
                    at: path.clone(),
                    path,
                    found: existing.kind(),
                });
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(value: Value) -> Catalog {
        Catalog::from_value(value).unwrap()
    }

    #[test]
    fn flatten_nested_paths_in_document_order() {
        let c = catalog(json!({
            "title": "Hi",
            "menu": { "file": { "open": "Open", "close": "Close" } },
            "count": 3
        }));
        let flat = flatten(&c);
        let paths: Vec<String> = flat.keys().map(ToString::to_string).collect();
        assert_eq!(
            paths,
            vec!["title", "menu.file.open", "menu.file.close", "count"]
        );
        assert_eq!(flat[&KeyPath::parse("count")], &json!(3));
    }

    #[test]
    fn flatten_treats_arrays_as_leaves() {
        let c = catalog(json!({ "days": ["Mon", "Tue"], "empty": {} }));
        let flat = flatten(&c);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[&KeyPath::parse("days")], &json!(["Mon", "Tue"]));
    }

    #[test]
    fn key_with_separator_stays_one_segment() {
        let c = catalog(json!({ "a.b": "dotted", "a": { "b": "nested" } }));
        let flat = flatten(&c);
        assert_eq!(flat.len(), 2);
        let dotted: KeyPath = ["a.b"].into_iter().collect();
        assert_eq!(flat[&dotted], &json!("dotted"));
        assert_eq!(flat[&KeyPath::parse("a.b")], &json!("nested"));
    }

    #[test]
    fn insert_path_creates_intermediate_branches() {
        let mut c = Catalog::new();
        c.insert_path(&KeyPath::parse("a.b.c"), Node::Leaf(json!("x")))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({ "a": { "b": { "c": "x" } } })
        );
    }

    #[test]
    fn insert_path_through_leaf_is_a_conflict() {
        let mut c = catalog(json!({ "a": "text" }));
        let err = c
            .insert_path(&KeyPath::parse("a.b"), Node::Leaf(json!("x")))
            .unwrap_err();
        assert_eq!(err.at, KeyPath::parse("a"));
        assert_eq!(err.found, "leaf");
        assert_eq!(c.get_path(&KeyPath::parse("a")).and_then(Node::as_str), Some("text"));
    }

    #[test]
    fn insert_leaf_over_branch_is_a_conflict() {
        let mut c = catalog(json!({ "a": { "b": "x" } }));
        let err = c
            .insert_path(&KeyPath::parse("a"), Node::Leaf(json!("y")))
            .unwrap_err();
        assert_eq!(err.found, "branch");
    }

    #[test]
    fn merge_keeps_existing_values() {
        let mut target = catalog(json!({ "a": { "b": "bonjour" } }));
        let delta = catalog(json!({ "a": { "b": "hello", "c": "monde" }, "d": "new" }));
        merge_missing(&mut target, &delta).unwrap();
        assert_eq!(
            serde_json::to_value(&target).unwrap(),
            json!({ "a": { "b": "bonjour", "c": "monde" }, "d": "new" })
        );
    }

    #[test]
    fn merge_reports_leaf_branch_collision() {
        let mut target = catalog(json!({ "a": "flat" }));
        let delta = catalog(json!({ "a": { "b": "nested" } }));
        let err = merge_missing(&mut target, &delta).unwrap_err();
        assert_eq!(err.path, KeyPath::parse("a"));
        assert_eq!(target, catalog(json!({ "a": "flat" })));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(Catalog::from_value(json!(["a"])).is_none());
        assert!(Catalog::from_value(json!("a")).is_none());
    }

    #[test]
    fn deserialize_preserves_order_and_leaf_types() {
        let c: Catalog =
            serde_json::from_str(r#"{"z": "last?", "a": {"n": 1, "t": true, "x": null}}"#)
                .unwrap();
        let keys: Vec<&String> = c.entries().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(
            c.get_path(&KeyPath::parse("a.t")),
            Some(&Node::Leaf(json!(true)))
        );
    }
}

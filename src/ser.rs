//! A plain-data view of logical trees for `serde`.
//!
//! Serializing a [`Document`] (or a [`DataView`] of any node) produces the
//! data the document describes rather than its syntax: maps keyed by
//! [`Pair::string_key`](crate::Pair::string_key), merge keys expanded,
//! aliases replaced by the nodes they refer to. Comments, tags, anchors
//! and styles are dropped.
//!
//! Merged entries never override keys written explicitly in the map, and
//! earlier merge sources win over later ones. An alias that refers to a
//! node containing itself cannot be expanded and fails serialization.
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::{parse_document_with, Options};
//!
//! let src = "base: &b { x: 1, y: 1 }\nderived:\n  <<: *b\n  y: 2\n";
//! let doc = parse_document_with(src, Options::new().with_merge(true));
//! let json = serde_json::to_value(&doc).unwrap();
//! assert_eq!(json["derived"], serde_json::json!({ "x": 1, "y": 2 }));
//! ```

use crate::anchors::{AnchorId, Anchors};
use crate::document::Document;
use crate::value::{Alias, Map, MapItem, Node, Number, Scalar, ScalarValue, Value};
use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cell::RefCell;

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.contents {
            None => serializer.serialize_unit(),
            Some(node) => DataView::new(node, &self.anchors).serialize(serializer),
        }
    }
}

/// Serializes `node` as plain data, looking aliases up in `anchors`.
///
/// Aliases are resolved within `node` itself. A view of a subtree whose
/// aliases point elsewhere in the document needs [`DataView::with_root`].
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::ser::DataView;
/// use lossless_yaml::{yaml, Anchors};
///
/// let node = yaml!({ "a": [1, 2.5, null] });
/// let anchors = Anchors::new();
/// let json = serde_json::to_string(&DataView::new(&node, &anchors)).unwrap();
/// assert_eq!(json, r#"{"a":[1,2.5,null]}"#);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DataView<'a> {
    node: &'a Node,
    root: &'a Node,
    anchors: &'a Anchors,
}

impl<'a> DataView<'a> {
    #[must_use]
    pub fn new(node: &'a Node, anchors: &'a Anchors) -> Self {
        DataView {
            node,
            root: node,
            anchors,
        }
    }

    /// Resolves aliases against `root`, the tree `anchors` was linked to.
    #[must_use]
    pub fn with_root(mut self, root: &'a Node) -> Self {
        self.root = root;
        self
    }
}

impl Serialize for DataView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let expanding = RefCell::new(Vec::new());
        Walker {
            node: self.node,
            root: self.root,
            anchors: self.anchors,
            expanding: &expanding,
        }
        .serialize(serializer)
    }
}

/// One node of a walk, sharing the stack of aliases being expanded.
struct Walker<'a> {
    node: &'a Node,
    root: &'a Node,
    anchors: &'a Anchors,
    expanding: &'a RefCell<Vec<AnchorId>>,
}

impl<'a> Walker<'a> {
    fn child(&self, node: &'a Node) -> Walker<'a> {
        Walker {
            node,
            root: self.root,
            anchors: self.anchors,
            expanding: self.expanding,
        }
    }

    /// The anchored node behind `alias`, with its id.
    fn target(&self, alias: &Alias) -> Result<(AnchorId, &'a Node), String> {
        let id = alias
            .target
            .or_else(|| self.anchors.lookup(&alias.source))
            .ok_or_else(|| format!("Unresolved alias *{}", alias.source))?;
        let node = self
            .anchors
            .resolve(
                self.root,
                &Alias {
                    source: alias.source.clone(),
                    target: Some(id),
                },
            )
            .ok_or_else(|| format!("Unresolved alias *{}", alias.source))?;
        if self.expanding.borrow().contains(&id) {
            return Err(format!("Circular alias *{}", alias.source));
        }
        Ok((id, node))
    }

    /// Map entries in order, merges expanded.
    fn entries(&self, map: &'a Map) -> Result<IndexMap<String, &'a Node>, String> {
        let mut entries: IndexMap<String, &'a Node> = IndexMap::new();
        for item in &map.items {
            match item {
                MapItem::Pair(pair) => {
                    if let Some(value) = pair.value.as_ref() {
                        entries.insert(pair.string_key(), value);
                    } else {
                        entries.insert(pair.string_key(), &NULL);
                    }
                }
                MapItem::Merge(merge) => {
                    for alias in merge.sources() {
                        let (id, source) = self.target(alias)?;
                        let Value::Map(source_map) = &source.value else {
                            return Err(format!("Merge source *{} is not a map", alias.source));
                        };
                        self.expanding.borrow_mut().push(id);
                        let merged = self.entries(source_map);
                        self.expanding.borrow_mut().pop();
                        for (key, value) in merged? {
                            entries.entry(key).or_insert(value);
                        }
                    }
                }
            }
        }
        Ok(entries)
    }
}

static NULL: Node = Node {
    value: Value::Scalar(Scalar {
        value: ScalarValue::Null,
        style: None,
        source: None,
    }),
    tag: None,
    anchor: None,
    comment: None,
    comment_before: None,
    space_before: false,
    range: None,
};

impl Serialize for Walker<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.node.value {
            Value::Scalar(scalar) => match &scalar.value {
                ScalarValue::Null => serializer.serialize_unit(),
                ScalarValue::Bool(b) => serializer.serialize_bool(*b),
                ScalarValue::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
                ScalarValue::Number(n) => serializer.serialize_f64(n.as_f64()),
                ScalarValue::String(s) => serializer.serialize_str(s),
            },
            Value::Seq(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for item in &seq.items {
                    out.serialize_element(&self.child(item))?;
                }
                out.end()
            }
            Value::Map(map) => {
                let entries = self.entries(map).map_err(S::Error::custom)?;
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(&key, &self.child(value))?;
                }
                out.end()
            }
            Value::Alias(alias) => {
                let (id, target) = self.target(alias).map_err(S::Error::custom)?;
                self.expanding.borrow_mut().push(id);
                let result = self.child(target).serialize(serializer);
                self.expanding.borrow_mut().pop();
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_document, parse_document_with, Options};
    use serde_json::json;

    #[test]
    fn test_scalars_and_collections() {
        let doc = parse_document("a: 1\nb: [true, ~, 1.5, text]\nc: { d: 0x10 }\n");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, json!({ "a": 1, "b": [true, null, 1.5, "text"], "c": { "d": 16 } }));
    }

    #[test]
    fn test_aliases_are_expanded() {
        let doc = parse_document("a: &x [1, 2]\nb: *x\n");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["b"], json!([1, 2]));
    }

    #[test]
    fn test_merge_order() {
        let src = "one: &o { k: 1, a: 1 }\ntwo: &t { k: 2, b: 2 }\nm:\n  k: 0\n  <<: [*o, *t]\n";
        let doc = parse_document_with(src, Options::new().with_merge(true));
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["m"], json!({ "k": 0, "a": 1, "b": 2 }));
    }

    #[test]
    fn test_merge_disabled_keeps_literal_key() {
        let doc = parse_document("b: &b { x: 1 }\nm: { <<: *b }\n");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["m"], json!({ "<<": { "x": 1 } }));
    }

    #[test]
    fn test_circular_alias_fails() {
        let doc = parse_document("&a [*a]\n");
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);
        assert!(serde_json::to_value(&doc).is_err());
    }

    #[test]
    fn test_aliases_follow_edits() {
        let mut doc = parse_document("a: &x\n  k: 1\nb: *x\n");
        let map = doc.contents.as_mut().and_then(Node::as_map_mut).unwrap();
        map.items[0].pair_mut().value = Some(Node::from(Map::new()).with_anchor("x"));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, json!({ "a": {}, "b": {} }));
    }

    #[test]
    fn test_subtree_view_with_root() {
        let doc = parse_document("a: &x 1\nb: [*x]\n");
        let root = doc.contents.as_ref().unwrap();
        let b = doc.get("b").unwrap();
        assert!(serde_json::to_value(DataView::new(b, &doc.anchors)).is_err());
        let view = DataView::new(b, &doc.anchors).with_root(root);
        assert_eq!(serde_json::to_value(view).unwrap(), json!([1]));
    }

    #[test]
    fn test_empty_document_is_null() {
        let doc = parse_document("# nothing\n");
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!(null));
    }
}

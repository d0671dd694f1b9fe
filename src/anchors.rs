//! Anchor bookkeeping for a resolved document.
//!
//! Resolution runs in two phases. While the tree is being built, each
//! `&anchor` is [`define`](Anchors::define)d before its children are
//! resolved, so aliases inside it (or later in the document) can record a
//! stable [`AnchorId`] without the anchored node existing yet. Once the
//! whole tree is finished, [`link`](Anchors::link) walks it and records
//! where each definition's node sits. Forward lookups and cycles never
//! need re-entrant resolution.
//!
//! Lookups read the tree they are given, not a copy, so an alias follows
//! edits made to its anchored node after parsing.
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::parse_document;
//!
//! let doc = parse_document("base: &b [1, 2]\ncopy: *b\n");
//! let root = doc.contents.as_ref().unwrap();
//! let copy = doc.get("copy").and_then(|n| n.as_alias()).unwrap();
//! let target = doc.anchors.resolve(root, copy).unwrap();
//! assert_eq!(target.as_seq().map(|s| s.len()), Some(2));
//! ```

use crate::cst::NodeType;
use crate::value::{Alias, Node, Value};
use indexmap::IndexMap;

/// Identifies one anchor definition within a document.
///
/// An anchor name may be redefined; each definition gets its own id and an
/// alias refers to the one most recently defined before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorId(usize);

/// One step from a node to a child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Key(usize),
    Value(usize),
    Item(usize),
}

#[derive(Clone, Debug, PartialEq)]
struct AnchorDef {
    name: String,
    kind: NodeType,
    /// Position of the anchored node below the root, once linked.
    path: Option<Vec<Step>>,
}

/// The anchors of one document, in definition order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Anchors {
    defs: Vec<AnchorDef>,
    /// Latest definition for each name.
    by_name: IndexMap<String, usize>,
}

impl Anchors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Registers an anchor named `name` on a CST node of type `kind`.
    pub fn define(&mut self, name: &str, kind: NodeType) -> AnchorId {
        let id = self.defs.len();
        self.defs.push(AnchorDef {
            name: name.to_string(),
            kind,
            path: None,
        });
        self.by_name.insert(name.to_string(), id);
        tracing::trace!(name, id, "defined anchor");
        AnchorId(id)
    }

    /// The most recent definition of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<AnchorId> {
        self.by_name.get(name).copied().map(AnchorId)
    }

    /// The CST node type the anchor was defined on.
    #[must_use]
    pub fn kind(&self, id: AnchorId) -> Option<NodeType> {
        self.defs.get(id.0).map(|def| def.kind)
    }

    #[must_use]
    pub fn name(&self, id: AnchorId) -> Option<&str> {
        self.defs.get(id.0).map(|def| def.name.as_str())
    }

    /// The node under `root` that `alias` refers to.
    ///
    /// The position recorded by [`link`](Anchors::link) is tried first. If
    /// the node found there no longer carries the anchor, the tree is
    /// searched for the n-th node with that anchor name, n being the
    /// definition's rank among definitions of the same name.
    #[must_use]
    pub fn resolve<'n>(&self, root: &'n Node, alias: &Alias) -> Option<&'n Node> {
        let id = alias.target.or_else(|| self.lookup(&alias.source))?;
        let def = self.defs.get(id.0)?;
        let recorded = def.path.as_deref().and_then(|path| follow(root, path));
        if let Some(node) = recorded.filter(|n| n.anchor.as_deref() == Some(def.name.as_str())) {
            return Some(node);
        }
        let mut rank = self.defs[..id.0].iter().filter(|d| d.name == def.name).count();
        nth_anchored(root, &def.name, &mut rank)
    }

    /// Records where the node of every definition sits below `root`.
    ///
    /// Anchored nodes are visited in the same pre-order in which they were
    /// defined, so the n-th node carrying a name fills the n-th definition
    /// of that name.
    pub fn link(&mut self, root: &Node) {
        let mut pending: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (i, def) in self.defs.iter().enumerate().rev() {
            pending.entry(def.name.as_str()).or_default().push(i);
        }
        let mut found = Vec::new();
        collect_anchored(root, &mut Vec::new(), &mut pending, &mut found);
        for (i, path) in found {
            self.defs[i].path = Some(path);
        }
        tracing::trace!(anchors = self.defs.len(), "linked anchors");
    }
}

/// Children in document order: each key before its value.
fn children(node: &Node) -> Vec<(Step, &Node)> {
    match &node.value {
        Value::Map(map) => map
            .pairs()
            .enumerate()
            .flat_map(|(i, pair)| {
                let key = pair.key.as_ref().map(|k| (Step::Key(i), k));
                let value = pair.value.as_ref().map(|v| (Step::Value(i), v));
                key.into_iter().chain(value)
            })
            .collect(),
        Value::Seq(seq) => seq.items.iter().enumerate().map(|(i, n)| (Step::Item(i), n)).collect(),
        Value::Scalar(_) | Value::Alias(_) => Vec::new(),
    }
}

fn follow<'n>(root: &'n Node, path: &[Step]) -> Option<&'n Node> {
    path.iter().try_fold(root, |node, step| match (&node.value, *step) {
        (Value::Map(map), Step::Key(i)) => map.items.get(i)?.key(),
        (Value::Map(map), Step::Value(i)) => map.items.get(i)?.value(),
        (Value::Seq(seq), Step::Item(i)) => seq.items.get(i),
        _ => None,
    })
}

fn nth_anchored<'n>(node: &'n Node, name: &str, rank: &mut usize) -> Option<&'n Node> {
    if node.anchor.as_deref() == Some(name) {
        if *rank == 0 {
            return Some(node);
        }
        *rank -= 1;
    }
    children(node)
        .into_iter()
        .find_map(|(_, child)| nth_anchored(child, name, rank))
}

fn collect_anchored(
    node: &Node,
    path: &mut Vec<Step>,
    pending: &mut IndexMap<&str, Vec<usize>>,
    found: &mut Vec<(usize, Vec<Step>)>,
) {
    if let Some(name) = node.anchor.as_deref() {
        if let Some(i) = pending.get_mut(name).and_then(Vec::pop) {
            found.push((i, path.clone()));
        }
    }
    for (step, child) in children(node) {
        path.push(step);
        collect_anchored(child, path, pending, found);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Pair, Seq};

    #[test]
    fn test_redefinition_shadows() {
        let mut anchors = Anchors::new();
        let first = anchors.define("a", NodeType::Plain);
        let second = anchors.define("a", NodeType::Map);
        assert_ne!(first, second);
        assert_eq!(anchors.lookup("a"), Some(second));
        assert_eq!(anchors.kind(first), Some(NodeType::Plain));
        assert_eq!(anchors.lookup("b"), None);
    }

    #[test]
    fn test_link_fills_definitions_in_order() {
        let mut anchors = Anchors::new();
        let first = anchors.define("a", NodeType::Plain);
        let second = anchors.define("a", NodeType::Plain);

        let mut seq = Seq::new();
        seq.push(Node::from(1).with_anchor("a"));
        seq.push(Node::from(2).with_anchor("a"));
        let root = Node::from(seq);
        anchors.link(&root);

        let alias = |id| Alias {
            source: "a".to_string(),
            target: Some(id),
        };
        assert_eq!(anchors.resolve(&root, &alias(first)).and_then(Node::as_i64), Some(1));
        assert_eq!(anchors.resolve(&root, &alias(second)).and_then(Node::as_i64), Some(2));
    }

    #[test]
    fn test_link_visits_keys_before_values() {
        let mut anchors = Anchors::new();
        let key = anchors.define("k", NodeType::Plain);
        let mut map = crate::value::Map::new();
        map.push(Pair::new(Node::from("x").with_anchor("k"), 1));
        let root = Node::from(map);
        anchors.link(&root);
        let alias = Alias {
            source: "k".to_string(),
            target: Some(key),
        };
        assert_eq!(anchors.resolve(&root, &alias).and_then(Node::as_str), Some("x"));
    }

    #[test]
    fn test_resolve_reads_the_edited_tree() {
        let mut anchors = Anchors::new();
        let id = anchors.define("a", NodeType::Plain);
        let mut seq = Seq::new();
        seq.push(Node::from(1).with_anchor("a"));
        let mut root = Node::from(seq);
        anchors.link(&root);

        let alias = Alias {
            source: "a".to_string(),
            target: Some(id),
        };
        if let Value::Seq(seq) = &mut root.value {
            seq.items[0] = Node::from(5).with_anchor("a");
        }
        assert_eq!(anchors.resolve(&root, &alias).and_then(Node::as_i64), Some(5));

        // Moved away from its recorded position
        if let Value::Seq(seq) = &mut root.value {
            seq.items.insert(0, Node::from(0));
        }
        assert_eq!(anchors.resolve(&root, &alias).and_then(Node::as_i64), Some(5));

        if let Value::Seq(seq) = &mut root.value {
            seq.items[1].anchor = None;
        }
        assert_eq!(anchors.resolve(&root, &alias), None);
    }
}

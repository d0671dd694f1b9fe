//! Block and flow mappings.

use super::utils::{flow_item_ranges, resolve_map_comments, CommentRecord};
use super::Resolver;
use crate::cst::{self, FlowItem, Indicator, NodeKind, NodeType, Range};
use crate::error::{ErrorKind, YamlError};
use crate::value::{Map, MapItem, Merge, Node, Number, Pair, ScalarStyle, ScalarValue, Value};

const MERGE_KEY: &str = "<<";

/// A key seen but not yet paired. `Some(None)` is an explicitly empty key.
type PendingKey = Option<Option<Node>>;

impl<'a> Resolver<'a> {
    /// Resolves a block or flow mapping. Returns the map and the comment
    /// that trails its last item.
    pub(crate) fn parse_map(&mut self, node: &cst::Node) -> Option<(Map, Option<String>)> {
        let (comments, pairs, flow) = match &node.kind {
            NodeKind::Map(items) => {
                let (comments, pairs) = self.resolve_block_map_items(node, items);
                (comments, pairs, false)
            }
            NodeKind::FlowMap(items) => {
                let (comments, pairs) = self.resolve_flow_map_items(node, items);
                (comments, pairs, true)
            }
            _ => {
                let message =
                    format!("A {} node cannot be resolved as a mapping", node.node_type());
                self.errors
                    .push(YamlError::syntax(message).with_range(node.range));
                return None;
            }
        };
        let mut items: Vec<MapItem> = pairs.into_iter().map(MapItem::Pair).collect();
        let comment = resolve_map_comments(&mut items, comments);

        for i in 0..items.len() {
            if self.merge && is_merge_key(items[i].key()) {
                if let Some(message) = self.merge_error(items[i].value()) {
                    self.errors.push(YamlError::semantic(message).with_range(node.range));
                }
                let item = std::mem::replace(&mut items[i], MapItem::Pair(Pair::default()));
                items[i] = match item {
                    MapItem::Pair(pair) => MapItem::Merge(Merge { pair }),
                    merge => merge,
                };
                continue;
            }
            let key = items[i].key();
            if let Some(dup) = items[i + 1..].iter().find(|other| keys_equal(key, other.key())) {
                let shown = dup.key().map_or_else(|| "null".to_string(), key_display);
                self.errors.push(
                    YamlError::semantic(format!("Map keys must be unique; \"{shown}\" is repeated"))
                        .with_range(node.range),
                );
            }
        }
        tracing::trace!(pairs = items.len(), flow, "resolved map");
        Some((Map { items, flow }, comment))
    }

    /// Checks that a merge value is an alias of a mapping, or a sequence
    /// of them. Aliases are checked by the CST type of their anchor so a
    /// merge may refer to a map that is still being built.
    fn merge_error(&self, value: Option<&Node>) -> Option<&'static str> {
        let sources: Vec<Option<&Node>> = match value.map(|v| &v.value) {
            Some(Value::Seq(seq)) => seq.items.iter().map(Some).collect(),
            _ => vec![value],
        };
        for source in sources {
            match source.map(|s| &s.value) {
                Some(Value::Alias(alias)) => {
                    let kind = alias.target.and_then(|id| self.anchors.kind(id));
                    if !kind.is_some_and(|k| k.is_map()) {
                        return Some("Merge nodes aliases can only point to maps");
                    }
                }
                Some(_) if source.is_some_and(|s| self.is_unresolved_alias(s)) => {}
                _ => return Some("Merge nodes can only have Alias nodes as values"),
            }
        }
        None
    }

    /// A null left in place of an alias already reported as unresolved.
    fn is_unresolved_alias(&self, node: &Node) -> bool {
        node.is_null()
            && node.range.is_some_and(|range| {
                self.errors
                    .iter()
                    .any(|e| e.kind() == ErrorKind::Reference && e.range() == Some(range))
            })
    }

    fn resolve_block_map_items(
        &mut self,
        map: &cst::Node,
        items: &[cst::Node],
    ) -> (Vec<CommentRecord>, Vec<Pair>) {
        let src = self.src;
        let ranges: Vec<Option<Range>> = items.iter().map(|item| Some(item.range)).collect();
        let mut comments = Vec::new();
        let mut pairs = Vec::new();
        let mut key: PendingKey = None;
        let mut key_start: Option<usize> = None;
        for (i, item) in items.iter().enumerate() {
            let after_key = matches!(key, Some(Some(_)));
            match &item.kind {
                NodeKind::BlankLine => comments.push(CommentRecord {
                    after_key,
                    before: pairs.len(),
                    comment: None,
                }),
                NodeKind::Comment => comments.push(CommentRecord {
                    after_key,
                    before: pairs.len(),
                    comment: item.comment(src),
                }),
                NodeKind::CollectionItem {
                    indicator: Indicator::Key,
                    ..
                } => {
                    if let Some(pending) = key.take() {
                        pairs.push(Pair::key_only(pending));
                    }
                    self.push_node_error(item);
                    key = Some(self.resolve_item_node(item));
                    key_start = None;
                }
                NodeKind::CollectionItem {
                    indicator: Indicator::Value,
                    node: child,
                } => {
                    let pair_key = key.take().flatten();
                    self.push_node_error(item);
                    if let Some(child) = child.as_deref() {
                        if !item.context.at_line_start
                            && child.node_type() == NodeType::Map
                            && !child.context.at_line_start
                        {
                            let message = "Nested mappings are not allowed in compact mappings";
                            self.errors
                                .push(YamlError::semantic(message).with_range(child.range));
                        }
                    }
                    let value = if child.is_some() {
                        self.resolve_item_node(item)
                    } else if !item.props.is_empty() {
                        // an anchor for comments on an empty value
                        let placeholder = cst::Node::placeholder(
                            item.range.start + 1,
                            item.range.orig_start.map(|o| o + 1),
                            item.context,
                        );
                        Some(self.resolve_with_props(&placeholder, &item.props))
                    } else {
                        None
                    };
                    let mut pair = Pair {
                        key: pair_key,
                        value,
                        ..Pair::default()
                    };
                    self.resolve_pair_comment(item, &mut pair);
                    self.check_key_length(map, &ranges, i, pair.key.as_ref(), key_start);
                    pairs.push(pair);
                    key_start = None;
                }
                _ => {
                    if let Some(pending) = key.take() {
                        pairs.push(Pair::key_only(pending));
                    }
                    key = Some(Some(self.resolve_node(item)));
                    key_start = Some(item.range.start);
                    let next = items[i + 1..]
                        .iter()
                        .find(|n| !matches!(n.kind, NodeKind::BlankLine | NodeKind::Comment));
                    if next.map(cst::Node::node_type) != Some(NodeType::MapValue) {
                        let message = "Implicit map keys need to be followed by map values";
                        self.errors
                            .push(YamlError::semantic(message).with_range(item.range));
                    }
                    if item.value_range_contains_newline(src) {
                        self.errors.push(
                            YamlError::semantic("Implicit map keys need to be on a single line")
                                .with_range(item.range),
                        );
                    }
                }
            }
        }
        if let Some(pending) = key {
            pairs.push(Pair::key_only(pending));
        }
        (comments, pairs)
    }

    /// A comment right after the `:` indicator, on its own line, belongs to
    /// the pair rather than to the value it would otherwise be read into.
    fn resolve_pair_comment(&self, item: &cst::Node, pair: &mut Pair) {
        if !self.value_has_pair_comment(item) {
            return;
        }
        let Some(comment) = item.prop_value(self.src, 0, b'#', true) else {
            return;
        };
        let Some(value) = pair.value.as_mut() else {
            return;
        };
        let rest = |s: &str| {
            s.get(comment.len() + 1..)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
        };
        let mut found = false;
        if let Some(cb) = value.comment_before.as_deref() {
            if cb.starts_with(comment) {
                value.comment_before = rest(cb);
                found = true;
            }
        }
        if !found && item.item_node().is_none() {
            if let Some(cc) = value.comment.as_deref() {
                if cc.starts_with(comment) {
                    value.comment = rest(cc);
                    found = true;
                }
            }
        }
        if found {
            pair.comment = Some(comment.to_string());
        }
    }

    fn value_has_pair_comment(&self, item: &cst::Node) -> bool {
        let Some(first) = item.props.first() else {
            return false;
        };
        if let Some(child) = item.item_node() {
            if first.start > child.value_range.start {
                return false;
            }
        }
        if self.src.as_bytes().get(first.start) != Some(&b'#') {
            return false;
        }
        self.src
            .get(item.context.line_start..first.start)
            .is_some_and(|prefix| !prefix.contains('\n'))
    }

    fn resolve_flow_map_items(
        &mut self,
        map: &cst::Node,
        items: &[FlowItem],
    ) -> (Vec<CommentRecord>, Vec<Pair>) {
        let src = self.src;
        let ranges = flow_item_ranges(items);
        let mut comments = Vec::new();
        let mut pairs = Vec::new();
        let mut key: PendingKey = None;
        let mut key_start: Option<usize> = None;
        let mut explicit_key = false;
        let mut next = '{';
        for (i, item) in items.iter().enumerate() {
            let after_key = matches!(key, Some(Some(_)));
            match item {
                FlowItem::Char { ch, offset, .. } => {
                    let ch = *ch;
                    if ch == '?' && key.is_none() && !explicit_key {
                        explicit_key = true;
                        next = ':';
                        continue;
                    }
                    if ch == ':' {
                        let pending = key.get_or_insert(None);
                        self.check_key_length(map, &ranges, i, pending.as_ref(), key_start);
                        key_start = None;
                        if next == ':' {
                            next = ',';
                            continue;
                        }
                    } else {
                        if explicit_key {
                            if key.is_none() && ch != ',' {
                                key = Some(None);
                            }
                            explicit_key = false;
                        }
                        if let Some(pending) = key.take() {
                            pairs.push(Pair::key_only(pending));
                            key_start = None;
                            if ch == ',' {
                                next = ':';
                                continue;
                            }
                        }
                    }
                    if ch == '}' {
                        if i == items.len() - 1 {
                            continue;
                        }
                    } else if ch == next {
                        next = ':';
                        continue;
                    }
                    self.errors.push(
                        YamlError::syntax(format!("Flow map contains an unexpected {ch}"))
                            .with_range(map.range)
                            .with_offset(*offset),
                    );
                }
                FlowItem::Node(node) => match node.kind {
                    NodeKind::BlankLine => comments.push(CommentRecord {
                        after_key,
                        before: pairs.len(),
                        comment: None,
                    }),
                    NodeKind::Comment => comments.push(CommentRecord {
                        after_key,
                        before: pairs.len(),
                        comment: node.comment(src),
                    }),
                    _ if key.is_none() => {
                        if next == ',' {
                            self.errors.push(
                                YamlError::syntax("Separator , missing in flow map")
                                    .with_range(node.range)
                                    .with_offset(node.range.start),
                            );
                            // the key starts a new entry
                            next = ':';
                        }
                        key = Some(Some(self.resolve_node(node)));
                        key_start = if explicit_key { None } else { Some(node.range.start) };
                    }
                    _ => {
                        if next != ',' {
                            self.errors.push(
                                YamlError::semantic("Indicator : missing in flow map entry")
                                    .with_range(node.range),
                            );
                        }
                        let value = self.resolve_node(node);
                        pairs.push(Pair {
                            key: key.take().flatten(),
                            value: Some(value),
                            ..Pair::default()
                        });
                        explicit_key = false;
                    }
                },
            }
        }
        self.check_flow_collection_end(map, items);
        if let Some(pending) = key {
            pairs.push(Pair::key_only(pending));
        }
        (comments, pairs)
    }
}

fn is_merge_key(key: Option<&Node>) -> bool {
    let Some(Node {
        value: Value::Scalar(scalar),
        ..
    }) = key
    else {
        return false;
    };
    let quoted = matches!(scalar.style, Some(ScalarStyle::QuoteDouble | ScalarStyle::QuoteSingle));
    !quoted && matches!(&scalar.value, ScalarValue::String(s) if s == MERGE_KEY)
}

/// Scalar keys compare by value; two missing keys are equal; collection
/// and alias keys are never equal to each other.
fn keys_equal(a: Option<&Node>, b: Option<&Node>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a.as_scalar(), b.as_scalar()) {
            (Some(ScalarValue::Number(x)), Some(ScalarValue::Number(y))) => numbers_equal(x, y),
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (x, y) {
        (Number::Integer(a), Number::Integer(b)) => a == b,
        (Number::NaN, _) | (_, Number::NaN) => false,
        _ => x.as_f64() == y.as_f64(),
    }
}

fn key_display(key: &Node) -> String {
    match key.as_scalar() {
        Some(ScalarValue::Null) => "null".to_string(),
        _ => key.to_plain_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{Context, Parser};
    use crate::options::Options;

    fn resolve(src: &str, merge: bool) -> (Node, Vec<YamlError>) {
        let cst = Parser::new(src).parse_node(Context::default(), 0).unwrap();
        let options = Options::default();
        let mut resolver = Resolver::new(src, &options, merge, &[]);
        let node = resolver.resolve_node(&cst);
        resolver.anchors.link(&node);
        (node, resolver.errors)
    }

    fn keys(node: &Node) -> Vec<String> {
        node.as_map().unwrap().pairs().map(Pair::string_key).collect()
    }

    #[test]
    fn test_block_map() {
        let (node, errors) = resolve("a: 1\nb: two\n? c\n", false);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(keys(&node), vec!["a", "b", "c"]);
        let map = node.as_map().unwrap();
        assert_eq!(map.get("a").and_then(Node::as_i64), Some(1));
        assert!(map.items[2].value().is_none());
        assert!(!map.flow);
    }

    #[test]
    fn test_duplicate_keys() {
        let (node, errors) = resolve("a: 1\na: 2\n", false);
        assert_eq!(node.as_map().unwrap().len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::Semantic);
        assert_eq!(errors[0].message(), "Map keys must be unique; \"a\" is repeated");
    }

    #[test]
    fn test_numeric_duplicate_keys() {
        let (_, errors) = resolve("{ 1: a, 1.0: b }", false);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_flow_map_key_only_entries() {
        let (node, errors) = resolve("{ a, b: 1 }", false);
        assert!(errors.is_empty(), "{errors:?}");
        let map = node.as_map().unwrap();
        assert!(map.flow);
        assert_eq!(keys(&node), vec!["a", "b"]);
        assert!(map.items[0].value().is_none());
    }

    #[test]
    fn test_missing_flow_separator() {
        let src = "{a: 1 b: 2}";
        let (node, errors) = resolve(src, false);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].kind(), ErrorKind::Syntax);
        assert_eq!(errors[0].offset(), src.find('b'));
        assert_eq!(keys(&node), vec!["a", "b"]);
    }

    #[test]
    fn test_unexpected_flow_indicator() {
        let (_, errors) = resolve("{ a: 1,, b: 2 }", false);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].message(), "Flow map contains an unexpected ,");
        assert_eq!(errors[0].offset(), Some(7));
    }

    #[test]
    fn test_implicit_key_without_value() {
        let (_, errors) = resolve("a: 1\nb\n", false);
        assert!(errors
            .iter()
            .any(|e| e.message() == "Implicit map keys need to be followed by map values"));
    }

    #[test]
    fn test_pair_comment() {
        let (node, errors) = resolve("a: # about a\n  b\n", false);
        assert!(errors.is_empty(), "{errors:?}");
        let pair = node.as_map().unwrap().items[0].pair();
        assert_eq!(pair.comment.as_deref(), Some(" about a"));
        let value = pair.value.as_ref().unwrap();
        assert_eq!(value.as_str(), Some("b"));
        assert_eq!(value.comment_before, None);
    }

    #[test]
    fn test_comment_on_empty_value() {
        let (node, _) = resolve("a: # nothing\nb: 1\n", false);
        let pair = node.as_map().unwrap().items[0].pair();
        assert_eq!(pair.comment.as_deref(), Some(" nothing"));
        assert!(pair.value.as_ref().is_some_and(Node::is_null));
    }

    #[test]
    fn test_blank_lines_and_comments_attach_to_next_pair() {
        let (node, _) = resolve("a: 1\n\n# about b\nb: 2\n# trailing\n", false);
        let map = node.as_map().unwrap();
        let b = map.items[1].pair();
        assert!(b.space_before);
        assert_eq!(b.comment_before(), Some(" about b"));
    }

    #[test]
    fn test_merge_keys() {
        let src = "- &base { x: 1 }\n- { <<: *base, y: 2 }\n";
        let (node, errors) = resolve(src, true);
        assert!(errors.is_empty(), "{errors:?}");
        let derived = node.as_seq().unwrap().items[1].as_map().unwrap();
        assert!(derived.items[0].is_merge());
        if let MapItem::Merge(merge) = &derived.items[0] {
            assert_eq!(merge.sources()[0].source, "base");
        }

        let (node, errors) = resolve(src, false);
        assert!(errors.is_empty());
        let derived = node.as_seq().unwrap().items[1].as_map().unwrap();
        assert!(!derived.items[0].is_merge());
        assert_eq!(derived.items[0].pair().string_key(), "<<");
    }

    #[test]
    fn test_merge_of_scalar_alias() {
        let (_, errors) = resolve("- &s text\n- { <<: *s }\n", true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Merge nodes aliases can only point to maps");

        let (_, errors) = resolve("{ <<: 1 }", true);
        assert_eq!(errors[0].message(), "Merge nodes can only have Alias nodes as values");
    }

    #[test]
    fn test_merge_of_alias_sequence() {
        let src = "- &a { x: 1 }\n- &b { y: 2 }\n- { <<: [*a, *b] }\n";
        let (node, errors) = resolve(src, true);
        assert!(errors.is_empty(), "{errors:?}");
        let derived = node.as_seq().unwrap().items[2].as_map().unwrap();
        if let MapItem::Merge(merge) = &derived.items[0] {
            let names: Vec<&str> = merge.sources().iter().map(|a| a.source.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        } else {
            panic!("expected a merge item");
        }

        let (_, errors) = resolve("- &a { x: 1 }\n- &s text\n- { <<: [*a, *s] }\n", true);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].message(), "Merge nodes aliases can only point to maps");

        let (_, errors) = resolve("- &a { x: 1 }\n- { <<: [*a, 1] }\n", true);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].message(), "Merge nodes can only have Alias nodes as values");
    }

    #[test]
    fn test_merge_of_unknown_alias() {
        let (_, errors) = resolve("{ <<: *nope }", true);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].kind(), ErrorKind::Reference);
        assert_eq!(errors[0].message(), "Aliased anchor not found: nope");
    }

    #[test]
    fn test_multi_line_implicit_key() {
        let (_, errors) = resolve("\"a\nb\": 1\n", false);
        assert!(
            errors
                .iter()
                .any(|e| e.message() == "Implicit map keys need to be on a single line"),
            "{errors:?}"
        );
    }

    #[test]
    fn test_compact_nested_map() {
        let (_, errors) = resolve("a: b: c\n", false);
        let nested = errors
            .iter()
            .find(|e| e.message() == "Nested mappings are not allowed in compact mappings");
        assert_eq!(nested.and_then(YamlError::offset), Some(3), "{errors:?}");
    }

    #[test]
    fn test_flow_entry_missing_value_indicator() {
        let (node, errors) = resolve("{ \"a\" \"b\" }", false);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].message(), "Indicator : missing in flow map entry");
        assert_eq!(node.as_map().map(Map::len), Some(1));
    }

    #[test]
    fn test_flow_explicit_keys() {
        let (node, errors) = resolve("{ ? a : b }", false);
        assert!(errors.is_empty(), "{errors:?}");
        let map = node.as_map().unwrap();
        assert_eq!(map.get("a").and_then(Node::as_str), Some("b"));

        let (node, errors) = resolve("{ ? a }", false);
        assert!(errors.is_empty(), "{errors:?}");
        let map = node.as_map().unwrap();
        assert_eq!(keys(&node), vec!["a"]);
        assert!(map.items[0].value().is_none());
    }

    #[test]
    fn test_long_key() {
        let key = format!("k{}z", "x".repeat(1998));
        let src = format!("{key}: 1\n");
        let (node, errors) = resolve(&src, false);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message().contains("kxxxxxxx...xxxxxxxz"));
        assert_eq!(node.as_map().map(Map::len), Some(1));
    }
}

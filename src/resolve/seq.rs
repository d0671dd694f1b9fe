//! Block and flow sequences.

use super::utils::{long_key_error, resolve_seq_comments, CommentRecord};
use super::Resolver;
use crate::cst::{self, FlowItem, Indicator, NodeKind};
use crate::error::YamlError;
use crate::value::{Map, MapItem, Node, Pair, Seq};

/// A flow sequence entry: a node, or a single-pair mapping written as
/// `[ key: value ]`.
enum Entry {
    Node(Node),
    Pair(Pair),
}

impl Entry {
    fn into_node(self) -> Node {
        match self {
            Entry::Node(node) => node,
            Entry::Pair(pair) => {
                let range = pair.key.as_ref().and_then(|k| k.range);
                let mut node = Node::from(Map {
                    items: vec![MapItem::Pair(pair)],
                    flow: true,
                });
                node.range = range;
                node
            }
        }
    }
}

impl<'a> Resolver<'a> {
    /// Resolves a block or flow sequence. Returns the sequence and the
    /// comment that trails its last item.
    pub(crate) fn parse_seq(&mut self, node: &cst::Node) -> Option<(Seq, Option<String>)> {
        let (comments, mut items, flow) = match &node.kind {
            NodeKind::Seq(items) => {
                let (comments, items) = self.resolve_block_seq_items(items);
                (comments, items, false)
            }
            NodeKind::FlowSeq(items) => {
                let (comments, items) = self.resolve_flow_seq_items(node, items);
                (comments, items, true)
            }
            _ => {
                let message =
                    format!("A {} node cannot be resolved as a sequence", node.node_type());
                self.errors
                    .push(YamlError::syntax(message).with_range(node.range));
                return None;
            }
        };
        let comment = resolve_seq_comments(&mut items, comments);
        tracing::trace!(items = items.len(), flow, "resolved sequence");
        Some((Seq { items, flow }, comment))
    }

    fn resolve_block_seq_items(&mut self, items: &[cst::Node]) -> (Vec<CommentRecord>, Vec<Node>) {
        let src = self.src;
        let mut comments = Vec::new();
        let mut nodes = Vec::new();
        for item in items {
            match &item.kind {
                NodeKind::BlankLine => comments.push(CommentRecord {
                    after_key: false,
                    before: nodes.len(),
                    comment: None,
                }),
                NodeKind::Comment => comments.push(CommentRecord {
                    after_key: false,
                    before: nodes.len(),
                    comment: item.comment(src),
                }),
                NodeKind::CollectionItem {
                    indicator: Indicator::SeqItem,
                    node: child,
                } => {
                    self.push_node_error(item);
                    let value = if child.is_some() {
                        self.resolve_item_node(item)
                    } else if !item.props.is_empty() {
                        let placeholder = cst::Node::placeholder(
                            item.range.start + 1,
                            item.range.orig_start.map(|o| o + 1),
                            item.context,
                        );
                        Some(self.resolve_with_props(&placeholder, &item.props))
                    } else {
                        None
                    };
                    nodes.push(value.unwrap_or_else(|| {
                        let mut null = Node::null();
                        null.range = Some(item.range);
                        null
                    }));
                    if item.has_props(src) {
                        let message =
                            "Sequence items cannot have tags or anchors before the - indicator";
                        self.errors
                            .push(YamlError::semantic(message).with_range(item.range));
                    }
                }
                _ => {
                    self.push_node_error(item);
                    let message = format!("Unexpected {} node in sequence", item.node_type());
                    self.errors
                        .push(YamlError::syntax(message).with_range(item.range));
                }
            }
        }
        (comments, nodes)
    }

    fn resolve_flow_seq_items(
        &mut self,
        seq: &cst::Node,
        items: &[FlowItem],
    ) -> (Vec<CommentRecord>, Vec<Node>) {
        let src = self.src;
        let mut comments = Vec::new();
        let mut entries: Vec<Entry> = Vec::new();
        let mut explicit_key = false;
        let mut key: Option<Option<Node>> = None;
        let mut key_start: Option<usize> = None;
        let mut next: Option<char> = Some('[');
        let mut prev_item: Option<&cst::Node> = None;
        for (i, item) in items.iter().enumerate() {
            match item {
                FlowItem::Char { ch, offset, .. } => {
                    let (ch, offset) = (*ch, *offset);
                    if ch != ':' && (explicit_key || key.is_some()) {
                        if explicit_key && key.is_none() {
                            key = Some(if next.is_some() {
                                entries.pop().map(Entry::into_node)
                            } else {
                                None
                            });
                        }
                        entries.push(Entry::Pair(Pair::key_only(key.take().flatten())));
                        explicit_key = false;
                        key_start = None;
                    }
                    if Some(ch) == next {
                        next = None;
                    } else if next.is_none() && ch == '?' {
                        explicit_key = true;
                    } else if next != Some('[') && ch == ':' && key.is_none() {
                        if next == Some(',') {
                            let popped = entries.pop();
                            if matches!(popped, Some(Entry::Pair(_))) {
                                self.errors.push(
                                    YamlError::semantic("Chaining flow sequence pairs is invalid")
                                        .with_range(seq.range)
                                        .with_offset(offset),
                                );
                            }
                            let popped = popped.map(Entry::into_node);
                            let implicit = (explicit_key, key_start, popped.as_ref());
                            if let (false, Some(start), Some(k)) = implicit {
                                if offset > start + self.options.max_key_length {
                                    self.errors.push(long_key_error(k).with_range(seq.range));
                                }
                                if src.get(start..offset).is_some_and(|s| s.contains('\n')) {
                                    let range = prev_item.map_or(seq.range, |p| p.range);
                                    let message = "Implicit keys of flow sequence pairs need to be \
                                                   on a single line";
                                    self.errors
                                        .push(YamlError::semantic(message).with_range(range));
                                }
                            }
                            key = Some(popped);
                        } else {
                            key = Some(None);
                        }
                        key_start = None;
                        explicit_key = false;
                        next = None;
                    } else if next == Some('[') || ch != ']' || i < items.len() - 1 {
                        self.errors.push(
                            YamlError::syntax(format!("Flow sequence contains an unexpected {ch}"))
                                .with_range(seq.range)
                                .with_offset(offset),
                        );
                    }
                }
                FlowItem::Node(node) => match node.kind {
                    NodeKind::BlankLine => comments.push(CommentRecord {
                        after_key: false,
                        before: entries.len(),
                        comment: None,
                    }),
                    NodeKind::Comment => comments.push(CommentRecord {
                        after_key: false,
                        before: entries.len(),
                        comment: node.comment(src),
                    }),
                    _ => {
                        if let Some(expected) = next {
                            let message = format!("Expected a {expected} in flow sequence");
                            self.errors
                                .push(YamlError::semantic(message).with_range(node.range));
                        }
                        let value = self.resolve_node(node);
                        match key.take() {
                            None => {
                                entries.push(Entry::Node(value));
                                prev_item = Some(node);
                            }
                            Some(k) => entries.push(Entry::Pair(Pair {
                                key: k,
                                value: Some(value),
                                ..Pair::default()
                            })),
                        }
                        key_start = Some(node.range.start);
                        next = Some(',');
                    }
                },
            }
        }
        self.check_flow_collection_end(seq, items);
        if let Some(k) = key {
            entries.push(Entry::Pair(Pair::key_only(k)));
        }
        (comments, entries.into_iter().map(Entry::into_node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{Context, Parser};
    use crate::options::Options;
    use crate::value::Value;

    fn resolve(src: &str) -> (Node, Vec<YamlError>) {
        let cst = Parser::new(src).parse_node(Context::default(), 0).unwrap();
        let options = Options::default();
        let mut resolver = Resolver::new(src, &options, false, &[]);
        let node = resolver.resolve_node(&cst);
        (node, resolver.errors)
    }

    #[test]
    fn test_block_seq() {
        let (node, errors) = resolve("- a\n-\n- 3\n");
        assert!(errors.is_empty(), "{errors:?}");
        let seq = node.as_seq().unwrap();
        assert_eq!(seq.len(), 3);
        assert!(seq.items[1].is_null());
        assert_eq!(seq.items[2].as_i64(), Some(3));
    }

    #[test]
    fn test_flow_seq_pairs() {
        let (node, errors) = resolve("[ a: 1, b ]");
        assert!(errors.is_empty(), "{errors:?}");
        let seq = node.as_seq().unwrap();
        assert!(seq.flow);
        let Value::Map(map) = &seq.items[0].value else {
            panic!("expected single-pair map");
        };
        assert!(map.flow);
        assert_eq!(map.get("a").and_then(Node::as_i64), Some(1));
        assert_eq!(seq.items[1].as_str(), Some("b"));
    }

    #[test]
    fn test_flow_seq_unexpected_indicator() {
        let (_, errors) = resolve("[ a, , b ]");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].message(), "Flow sequence contains an unexpected ,");
    }

    #[test]
    fn test_flow_seq_missing_comma() {
        let (_, errors) = resolve("[ \"a\" \"b\" ]");
        assert!(errors.iter().any(|e| e.message() == "Expected a , in flow sequence"));
    }

    #[test]
    fn test_props_before_indicator() {
        let (_, errors) = resolve("&a - x\n");
        let message = "Sequence items cannot have tags or anchors before the - indicator";
        assert!(errors.iter().any(|e| e.message() == message));
    }
}

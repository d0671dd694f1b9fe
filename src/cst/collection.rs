//! Block collections, their items, and flow collections.

use super::node::{Context, FlowItem, Indicator, Node, NodeKind, NodeType};
use super::parser::Parser;
use super::range::Range;
use super::source::{
    end_of_indent, end_of_line, end_of_white_space, is_blank, next_content_has_indent,
    next_node_is_indented, normalize_offset, start_of_line,
};
use crate::error::YamlError;

impl<'a> Parser<'a> {
    /// A blank line node covering the newline at `start`.
    pub(crate) fn parse_blank_line(&self, start: usize) -> Node {
        let mut node = Node::new(NodeKind::BlankLine, Context::default());
        node.range = Range::new(start, start + 1);
        node
    }

    /// A standalone comment line starting with the `#` at `start`.
    pub(crate) fn parse_comment_line(&self, context: Context, start: usize) -> Node {
        let mut node = Node::new(NodeKind::Comment, context);
        let end = self.parse_comment(&mut node, start);
        node.range = Range::new(start, end);
        node
    }

    /// Parses a `?`, `:` or `-` item and the node it introduces.
    pub(crate) fn parse_collection_item(&self, item: &mut Node, start: usize) -> usize {
        let NodeKind::CollectionItem { indicator, .. } = item.kind else {
            return start;
        };
        let context = item.context;
        let mut at_line_start = context.at_line_start;
        let mut line_start = context.line_start;
        if !at_line_start && indicator == Indicator::SeqItem {
            item.error = Some(YamlError::semantic(
                "Sequence items must not have preceding content on the same line",
            ));
        }
        let indent = if at_line_start {
            start as isize - line_start as isize
        } else {
            context.indent
        };

        let mut offset = end_of_white_space(self.bytes, start + 1);
        let mut ch = self.byte(offset);
        let inline_comment = ch == Some(b'#');
        let mut comments = Vec::new();
        while let Some(c @ (b'\n' | b'#')) = ch {
            if c == b'#' {
                let end = end_of_line(self.bytes, offset + 1);
                comments.push(Range::new(offset, end));
                offset = end;
            } else {
                at_line_start = true;
                line_start = offset + 1;
                let ws_end = end_of_white_space(self.bytes, line_start);
                if self.byte(ws_end) == Some(b'\n') && comments.is_empty() {
                    line_start += 1;
                }
                offset = end_of_indent(self.bytes, line_start);
            }
            ch = self.byte(offset);
        }

        let indent_diff = offset as isize - (line_start as isize + indent);
        let child = if next_node_is_indented(ch, indent_diff, indicator != Indicator::SeqItem) {
            let child_context = Context {
                at_line_start,
                in_collection: false,
                in_flow: false,
                indent,
                line_start,
                flow_value: false,
                indicator_as_indent: !(indicator == Indicator::SeqItem && context.at_line_start),
            };
            self.parse_node(child_context, offset)
        } else {
            None
        };

        let (end, value_end) = match child {
            Some(child) => {
                item.props.extend(comments);
                let end = child.range.end;
                let value_end = child.value_range.end;
                if let NodeKind::CollectionItem { node, .. } = &mut item.kind {
                    *node = Some(Box::new(child));
                }
                (end, value_end)
            }
            None => {
                let end = match comments.first() {
                    Some(comment) if inline_comment => {
                        item.props.push(*comment);
                        comment.end
                    }
                    _ => end_of_line(self.bytes, start + 1),
                };
                (end, end)
            }
        };
        item.value_range = Range::new(start, value_end);
        end
    }

    /// Wraps the first item of a block collection. Props that precede the
    /// item's line belong to the collection.
    pub(crate) fn start_collection(&self, mut first: Node, context: Context) -> Node {
        let is_seq = first.node_type() == NodeType::SeqItem;
        let mut props = Vec::new();
        if let Some(i) = first.props.iter().rposition(|p| p.start < first.context.line_start) {
            props = first.props.drain(..=i).collect();
            first.range.start = first
                .props
                .first()
                .map_or(first.value_range.start, |p| p.start);
        }
        let mut items = vec![first];
        if let Some(end_comments) = grab_collection_end_comments(&mut items[0]) {
            items.extend(end_comments);
        }
        let mut collection = Node::new(
            if is_seq {
                NodeKind::Seq(items)
            } else {
                NodeKind::Map(items)
            },
            context,
        );
        collection.props = props;
        collection
    }

    /// Continues a block collection after its first item.
    pub(crate) fn parse_collection(&self, collection: &mut Node, start: usize) -> usize {
        let mut items = match &mut collection.kind {
            NodeKind::Map(items) | NodeKind::Seq(items) => std::mem::take(items),
            _ => return start,
        };
        let offset = self.parse_collection_items(collection, &mut items, start);
        if let NodeKind::Map(slot) | NodeKind::Seq(slot) = &mut collection.kind {
            *slot = items;
        }
        offset
    }

    fn parse_collection_items(
        &self,
        collection: &mut Node,
        items: &mut Vec<Node>,
        start: usize,
    ) -> usize {
        let bytes = self.bytes;
        let Some(first) = items.first() else {
            return start;
        };
        let is_seq = first.node_type() == NodeType::SeqItem;
        let indent = first.range.start as isize - first.context.line_start as isize;
        collection.value_range = first.value_range;

        let mut line_start = start_of_line(bytes, start);
        let mut offset = normalize_offset(bytes, start);
        let mut ch = self.byte(offset);
        let mut at_line_start = end_of_white_space(bytes, line_start) == offset;
        let mut prev_includes_trailing_lines = false;
        while ch.is_some() {
            while let Some(c @ (b'\n' | b'#')) = ch {
                if at_line_start && c == b'\n' && !prev_includes_trailing_lines {
                    let blank = self.parse_blank_line(offset);
                    offset = blank.range.end;
                    collection.value_range.end = offset;
                    if offset >= bytes.len() {
                        ch = None;
                        break;
                    }
                    items.push(blank);
                    offset -= 1;
                } else if c == b'#' {
                    if (offset as isize) < line_start as isize + indent
                        && !next_content_has_indent(bytes, offset, indent)
                    {
                        return offset;
                    }
                    let context = Context {
                        indent,
                        line_start,
                        ..Context::default()
                    };
                    let comment = self.parse_comment_line(context, offset);
                    offset = comment.range.end;
                    items.push(comment);
                    collection.value_range.end = offset;
                    if offset >= bytes.len() {
                        ch = None;
                        break;
                    }
                }
                line_start = offset + 1;
                offset = end_of_indent(bytes, line_start);
                if matches!(self.byte(offset), Some(b'\n' | b'\t' | b' ')) {
                    let ws_end = end_of_white_space(bytes, offset);
                    if matches!(self.byte(ws_end), None | Some(b'\n' | b'#')) {
                        offset = ws_end;
                    }
                }
                ch = self.byte(offset);
                at_line_start = true;
            }
            let Some(c) = ch else {
                break;
            };

            let item_column = line_start as isize + indent;
            if offset as isize != item_column && (at_line_start || c != b':') {
                if (offset as isize) < item_column {
                    if line_start > start {
                        offset = line_start;
                    }
                    break;
                } else if collection.error.is_none() {
                    collection.error = Some(YamlError::syntax(
                        "All collection items must start at the same column",
                    ));
                }
            }
            if is_seq {
                if c != b'-' {
                    if line_start > start {
                        offset = line_start;
                    }
                    break;
                }
            } else if c == b'-' && collection.error.is_none() && is_blank(self.byte(offset + 1)) {
                // a map key may start with `-` if a non-blank follows
                collection.error = Some(YamlError::syntax(
                    "A collection cannot be both a mapping and a sequence",
                ));
            }

            let context = Context {
                at_line_start,
                in_collection: true,
                in_flow: false,
                indent,
                line_start,
                flow_value: false,
                indicator_as_indent: true,
            };
            let Some(mut node) = self.parse_node(context, offset) else {
                return offset;
            };
            collection.value_range.end = node.value_range.end;
            offset = normalize_offset(bytes, node.range.end);
            ch = self.byte(offset);
            at_line_start = false;
            prev_includes_trailing_lines = node.includes_trailing_lines();
            // the node may have advanced past line ends
            if ch.is_some() {
                let mut ls = offset;
                while ls > 0 && matches!(bytes[ls - 1], b' ' | b'\t') {
                    ls -= 1;
                }
                if ls > 0 && bytes[ls - 1] == b'\n' {
                    line_start = ls;
                    at_line_start = true;
                }
            }
            let end_comments = grab_collection_end_comments(&mut node);
            items.push(node);
            if let Some(end_comments) = end_comments {
                items.extend(end_comments);
            }
        }
        offset
    }

    /// Parses a `{...}` or `[...]` collection starting at its opening bracket.
    pub(crate) fn parse_flow_collection(&self, collection: &mut Node, start: usize) -> usize {
        let is_map = matches!(collection.kind, NodeKind::FlowMap(_));
        let indent = collection.context.indent;
        let mut line_start = collection.context.line_start;
        let mut items = vec![FlowItem::Char {
            ch: if is_map { '{' } else { '[' },
            offset: start,
            orig_offset: None,
        }];
        let mut offset = end_of_white_space(self.bytes, start + 1);
        let mut ch = self.byte(offset);
        while let Some(c) = ch {
            if c == b']' || c == b'}' {
                break;
            }
            match c {
                b'\n' => {
                    line_start = offset + 1;
                    let ws_end = end_of_white_space(self.bytes, line_start);
                    if self.byte(ws_end) == Some(b'\n') {
                        let blank = self.parse_blank_line(line_start);
                        line_start = blank.range.end;
                        items.push(FlowItem::Node(blank));
                    }
                    offset = end_of_indent(self.bytes, line_start);
                    let column = line_start as isize + indent;
                    if offset as isize <= column {
                        let next = self.byte(offset);
                        if ((offset as isize) < column || !matches!(next, Some(b']' | b'}')))
                            && collection.error.is_none()
                        {
                            collection.error = Some(YamlError::semantic(
                                "Insufficient indentation in flow collection",
                            ));
                        }
                    }
                }
                b',' => {
                    items.push(FlowItem::Char {
                        ch: ',',
                        offset,
                        orig_offset: None,
                    });
                    offset += 1;
                }
                b'#' => {
                    let context = Context {
                        in_flow: true,
                        line_start,
                        ..Context::default()
                    };
                    let comment = self.parse_comment_line(context, offset);
                    offset = comment.range.end;
                    items.push(FlowItem::Node(comment));
                }
                b'?' | b':' if self.is_flow_indicator_at(offset, c, &items) => {
                    items.push(FlowItem::Char {
                        ch: c as char,
                        offset,
                        orig_offset: None,
                    });
                    offset += 1;
                }
                _ => {
                    let context = Context {
                        at_line_start: false,
                        in_collection: false,
                        in_flow: true,
                        indent: -1,
                        line_start,
                        flow_value: is_map
                            && matches!(items.last(), Some(FlowItem::Char { ch: ':', .. })),
                        indicator_as_indent: true,
                    };
                    let Some(node) = self.parse_node(context, offset) else {
                        // at the next document start
                        collection.value_range = Range::new(start, offset);
                        set_flow_items(collection, items);
                        return offset;
                    };
                    offset = normalize_offset(self.bytes, node.range.end);
                    items.push(FlowItem::Node(node));
                }
            }
            offset = end_of_white_space(self.bytes, offset);
            ch = self.byte(offset);
        }
        collection.value_range = Range::new(start, (offset + 1).min(self.bytes.len()));
        if let Some(c) = ch {
            items.push(FlowItem::Char {
                ch: c as char,
                offset,
                orig_offset: None,
            });
            offset = end_of_white_space(self.bytes, offset + 1);
            offset = self.parse_comment(collection, offset);
        }
        set_flow_items(collection, items);
        offset
    }

    /// A flow `?` or `:` is an indicator when followed by a blank or `,`; a
    /// `:` after a quoted scalar or flow collection needs no blank.
    fn is_flow_indicator_at(&self, offset: usize, ch: u8, items: &[FlowItem]) -> bool {
        let next = self.byte(offset + 1);
        if matches!(next, Some(b'\n' | b'\t' | b' ' | b',')) {
            return true;
        }
        ch == b':' && prev_node_is_json_like(items)
    }
}

fn prev_node_is_json_like(items: &[FlowItem]) -> bool {
    for item in items.iter().rev() {
        match item {
            FlowItem::Node(node) if node.kind == NodeKind::Comment => continue,
            FlowItem::Node(node) => return node.is_json_like(),
            FlowItem::Char { .. } => return false,
        }
    }
    false
}

fn set_flow_items(collection: &mut Node, items: Vec<FlowItem>) {
    if let NodeKind::FlowMap(slot) | NodeKind::FlowSeq(slot) = &mut collection.kind {
        *slot = items;
    }
}

/// Detaches trailing comment and blank line items from the innermost
/// collection under `node`, shrinking the ranges along the way.
///
/// A comment indented deeper than its collection stays with it.
pub(crate) fn grab_collection_end_comments(node: &mut Node) -> Option<Vec<Node>> {
    let grabbed = match &mut node.kind {
        NodeKind::CollectionItem { node: Some(child), .. } => grab_collection_end_comments(child)?,
        NodeKind::Map(items) | NodeKind::Seq(items) => {
            let mut cut = None;
            for (i, item) in items.iter().enumerate().rev() {
                match item.kind {
                    NodeKind::Comment => {
                        let Context { indent, line_start, .. } = item.context;
                        if indent > 0 && item.range.start as isize >= line_start as isize + indent {
                            break;
                        }
                        cut = Some(i);
                    }
                    NodeKind::BlankLine => cut = Some(i),
                    _ => break,
                }
            }
            let cut = cut?;
            items.split_off(cut)
        }
        _ => return None,
    };
    let prev_end = grabbed.first()?.range.start;
    node.range.end = prev_end;
    if node.value_range.end > prev_end {
        node.value_range.end = prev_end;
    }
    Some(grabbed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Node {
        Parser::new(src)
            .parse_node(Context::document(true, 0), 0)
            .unwrap()
    }

    fn items(node: &Node) -> &[Node] {
        match &node.kind {
            NodeKind::Map(items) | NodeKind::Seq(items) => items,
            other => panic!("not a block collection: {other:?}"),
        }
    }

    #[test]
    fn test_block_map_items() {
        let src = "a: 1\nb: 2\n";
        let map = parse(src);
        assert_eq!(map.node_type(), NodeType::Map);
        let types: Vec<NodeType> = items(&map).iter().map(Node::node_type).collect();
        assert_eq!(
            types,
            vec![NodeType::Plain, NodeType::MapValue, NodeType::Plain, NodeType::MapValue]
        );
        assert_eq!(items(&map)[1].item_node().unwrap().raw_value(src), "1");
    }

    #[test]
    fn test_block_seq_with_comment_and_blank_line() {
        let src = "- a\n\n# c\n- b\n";
        let seq = parse(src);
        let types: Vec<NodeType> = items(&seq).iter().map(Node::node_type).collect();
        assert_eq!(
            types,
            vec![NodeType::SeqItem, NodeType::BlankLine, NodeType::Comment, NodeType::SeqItem]
        );
    }

    #[test]
    fn test_nested_map() {
        let src = "a:\n  b: c\nd: e\n";
        let map = parse(src);
        let map_items = items(&map);
        assert_eq!(map_items.len(), 4);
        let nested = map_items[1].item_node().unwrap();
        assert_eq!(nested.node_type(), NodeType::Map);
        assert_eq!(items(nested).len(), 2);
    }

    #[test]
    fn test_mixed_collection_error() {
        let map = parse("a: 1\n- b\n");
        assert_eq!(
            map.error.as_ref().map(YamlError::message),
            Some("A collection cannot be both a mapping and a sequence")
        );
    }

    #[test]
    fn test_flow_map_items() {
        let src = "{ a: 1, \"b\":2 }";
        let map = parse(src);
        let NodeKind::FlowMap(items) = &map.kind else {
            panic!("expected flow map");
        };
        let chars: Vec<Option<char>> = items.iter().map(FlowItem::as_char).collect();
        assert_eq!(
            chars,
            vec![Some('{'), None, Some(':'), None, Some(','), None, Some(':'), None, Some('}')]
        );
    }

    #[test]
    fn test_flow_value_stops_before_implicit_key() {
        let src = "{ a: b c: d }";
        let map = parse(src);
        let NodeKind::FlowMap(items) = &map.kind else {
            panic!("expected flow map");
        };
        let values: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                FlowItem::Node(node) => Some(node.raw_value(src)),
                FlowItem::Char { .. } => None,
            })
            .collect();
        assert_eq!(values, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dedented_comment_ends_nested_collection() {
        let src = "a:\n  - b\n# c\nd: e\n";
        let map = parse(src);
        let types: Vec<NodeType> = items(&map).iter().map(Node::node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Plain,
                NodeType::MapValue,
                NodeType::Comment,
                NodeType::Plain,
                NodeType::MapValue
            ]
        );
    }
}

//! The value-node tokenizer.
//!
//! [`Parser::parse_node`] reads the next structural value node starting at
//! an offset: its props, then a scalar, alias, flow collection or block
//! collection item. A node that begins a block collection is wrapped in a
//! [`NodeKind::Map`] or [`NodeKind::Seq`] which then consumes its siblings.
//! Returns `None` at end of input or at a document boundary.

use super::node::{BlockHeader, Chomp, Context, Indicator, Node, NodeKind};
use super::range::Range;
use super::source::{
    at_document_boundary, byte_at, end_of_block_indent, end_of_indent, end_of_line,
    end_of_white_space, is_blank, is_flow_indicator, next_node_is_indented,
};
use crate::error::YamlError;

/// Recursive-descent parser over one source buffer.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    pub(crate) src: &'a str,
    pub(crate) bytes: &'a [u8],
}

enum ValueType {
    Alias,
    BlockFolded,
    BlockLiteral,
    FlowMap,
    FlowSeq,
    Item(Indicator),
    Plain,
    QuoteDouble,
    QuoteSingle,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Parser {
            src,
            bytes: src.as_bytes(),
        }
    }

    #[inline]
    pub(crate) fn byte(&self, offset: usize) -> Option<u8> {
        byte_at(self.bytes, offset)
    }

    /// Parses the next value node at `start`.
    pub fn parse_node(&self, context: Context, start: usize) -> Option<Node> {
        if at_document_boundary(self.bytes, start, None) {
            return None;
        }
        let mut context = context;
        let (props, value_type, value_start) = self.parse_props(&mut context, start);
        let mut node = match value_type {
            ValueType::Alias => Node::new(NodeKind::Alias, context),
            ValueType::BlockFolded => {
                Node::new(NodeKind::BlockFolded(BlockHeader::default()), context)
            }
            ValueType::BlockLiteral => {
                Node::new(NodeKind::BlockLiteral(BlockHeader::default()), context)
            }
            ValueType::FlowMap => Node::new(NodeKind::FlowMap(Vec::new()), context),
            ValueType::FlowSeq => Node::new(NodeKind::FlowSeq(Vec::new()), context),
            ValueType::Item(indicator) => {
                Node::new(NodeKind::CollectionItem { indicator, node: None }, context)
            }
            ValueType::Plain => Node::new(NodeKind::Plain, context),
            ValueType::QuoteDouble => Node::new(NodeKind::QuoteDouble, context),
            ValueType::QuoteSingle => Node::new(NodeKind::QuoteSingle, context),
        };
        node.props = props;
        let mut offset = match node.kind {
            NodeKind::Alias => self.parse_alias(&mut node, value_start),
            NodeKind::BlockFolded(_) | NodeKind::BlockLiteral(_) => {
                self.parse_block_value(&mut node, value_start)
            }
            NodeKind::FlowMap(_) | NodeKind::FlowSeq(_) => {
                self.parse_flow_collection(&mut node, value_start)
            }
            NodeKind::CollectionItem { .. } => self.parse_collection_item(&mut node, value_start),
            NodeKind::QuoteDouble => self.parse_quote_double(&mut node, value_start),
            NodeKind::QuoteSingle => self.parse_quote_single(&mut node, value_start),
            _ => self.parse_plain(&mut node, value_start),
        };
        node.range = Range::new(start, offset);
        if offset <= start {
            node.error =
                Some(YamlError::syntax("Node consumed no characters").with_range(node.range));
            node.range.end = start + 1;
            offset = start + 1;
        }
        tracing::trace!(node_type = %node.node_type(), start, end = offset, "parsed node");
        if self.node_starts_collection(&node) {
            let document_level = node.context.indent == -1 && !node.context.in_flow;
            if node.error.is_none() && !node.context.at_line_start && document_level {
                let message = "Block collection must not have preceding content here \
                               (e.g. directives-end indicator)";
                node.error = Some(YamlError::syntax(message).with_range(node.range));
            }
            let collection_context = node.context;
            let mut collection = self.start_collection(node, collection_context);
            let end = self.parse_collection(&mut collection, offset);
            collection.range = Range::new(start, end);
            return Some(collection);
        }
        Some(node)
    }

    fn parse_props(&self, context: &mut Context, start: usize) -> (Vec<Range>, ValueType, usize) {
        let mut props = Vec::new();
        let mut line_has_props = false;
        let mut offset = if context.at_line_start {
            end_of_indent(self.bytes, start)
        } else {
            end_of_white_space(self.bytes, start)
        };
        while let Some(ch @ (b'&' | b'#' | b'!' | b'\n')) = self.byte(offset) {
            match ch {
                b'\n' => {
                    let mut in_end = offset;
                    let mut line_start;
                    loop {
                        line_start = in_end + 1;
                        in_end = end_of_indent(self.bytes, line_start);
                        if self.byte(in_end) != Some(b'\n') {
                            break;
                        }
                    }
                    let indent_diff = in_end as isize - (line_start as isize + context.indent);
                    let next = self.byte(in_end);
                    if next != Some(b'#')
                        && !next_node_is_indented(next, indent_diff, context.indicator_as_indent)
                    {
                        break;
                    }
                    if at_document_boundary(self.bytes, line_start, None) {
                        break;
                    }
                    context.at_line_start = true;
                    context.line_start = line_start;
                    line_has_props = false;
                    offset = in_end;
                }
                b'#' => {
                    let end = end_of_line(self.bytes, offset + 1);
                    props.push(Range::new(offset, end));
                    offset = end;
                }
                _ => {
                    let end = self.end_of_identifier(offset + 1);
                    props.push(Range::new(offset, end));
                    line_has_props = true;
                    offset = end_of_white_space(self.bytes, end);
                }
            }
        }
        // `- &a : b` has an anchor on an empty node
        if line_has_props && self.byte(offset) == Some(b':') && is_blank(self.byte(offset + 1)) {
            offset -= 1;
        }
        (props, self.parse_type(offset, context.in_flow), offset)
    }

    fn parse_type(&self, offset: usize, in_flow: bool) -> ValueType {
        let indicator_ok = !in_flow && is_blank(self.byte(offset + 1));
        match self.byte(offset) {
            Some(b'*') => ValueType::Alias,
            Some(b'>') => ValueType::BlockFolded,
            Some(b'|') => ValueType::BlockLiteral,
            Some(b'{') => ValueType::FlowMap,
            Some(b'[') => ValueType::FlowSeq,
            Some(b'?') if indicator_ok => ValueType::Item(Indicator::Key),
            Some(b':') if indicator_ok => ValueType::Item(Indicator::Value),
            Some(b'-') if indicator_ok => ValueType::Item(Indicator::SeqItem),
            Some(b'"') => ValueType::QuoteDouble,
            Some(b'\'') => ValueType::QuoteSingle,
            _ => ValueType::Plain,
        }
    }

    fn node_starts_collection(&self, node: &Node) -> bool {
        let context = &node.context;
        if context.in_collection || context.in_flow {
            return false;
        }
        if matches!(node.kind, NodeKind::CollectionItem { .. }) {
            return true;
        }
        let end = node.range.end;
        if self.byte(end) == Some(b'\n') || (end > 0 && self.byte(end - 1) == Some(b'\n')) {
            return false;
        }
        self.byte(end_of_white_space(self.bytes, end)) == Some(b':')
    }

    pub(crate) fn end_of_identifier(&self, mut offset: usize) -> usize {
        let verbatim = self.byte(offset) == Some(b'<');
        while let Some(ch) = self.byte(offset) {
            let stop = if verbatim {
                matches!(ch, b'\n' | b'\t' | b' ' | b'>')
            } else {
                matches!(ch, b'\n' | b'\t' | b' ') || is_flow_indicator(ch)
            };
            if stop {
                break;
            }
            offset += 1;
        }
        if verbatim && self.byte(offset) == Some(b'>') {
            offset += 1;
        }
        offset
    }

    /// Adds a same-line comment at `start` to the node's props.
    pub(crate) fn parse_comment(&self, node: &mut Node, start: usize) -> usize {
        if self.byte(start) == Some(b'#') {
            let end = end_of_line(self.bytes, start + 1);
            node.props.push(Range::new(start, end));
            return end;
        }
        start
    }

    fn parse_alias(&self, node: &mut Node, start: usize) -> usize {
        let end = self.end_of_identifier(start + 1);
        node.value_range = Range::new(start + 1, end);
        let offset = end_of_white_space(self.bytes, end);
        self.parse_comment(node, offset)
    }

    fn plain_end_of_line(&self, start: usize, in_flow: bool, flow_value: bool) -> usize {
        let mut offset = start;
        while let Some(ch) = self.byte(offset) {
            if ch == b'\n' || (in_flow && is_flow_indicator(ch)) {
                break;
            }
            let next = self.byte(offset + 1);
            if ch == b':' && (is_blank(next) || (in_flow && next == Some(b','))) {
                break;
            }
            if (ch == b' ' || ch == b'\t') && next == Some(b'#') {
                break;
            }
            if flow_value && (ch == b' ' || ch == b'\t') && self.implicit_key_follows(offset) {
                break;
            }
            offset += 1;
        }
        offset
    }

    /// Whether the word after the whitespace at `offset` is an implicit key.
    fn implicit_key_follows(&self, offset: usize) -> bool {
        let word_start = end_of_white_space(self.bytes, offset);
        let mut end = word_start;
        while let Some(ch) = self.byte(end) {
            if matches!(ch, b'\n' | b'\t' | b' ' | b':') || is_flow_indicator(ch) {
                break;
            }
            end += 1;
        }
        if end == word_start || self.byte(end) != Some(b':') {
            return false;
        }
        let after = self.byte(end + 1);
        is_blank(after) || after == Some(b',')
    }

    fn parse_plain(&self, node: &mut Node, start: usize) -> usize {
        let Context {
            in_flow, flow_value, ..
        } = node.context;
        let mut offset = start;
        if !matches!(self.byte(offset), None | Some(b'#' | b'\n')) {
            offset = self.plain_end_of_line(start, in_flow, flow_value);
        }
        let mut value_end = offset;
        while value_end > start && matches!(self.byte(value_end - 1), Some(b' ' | b'\t')) {
            value_end -= 1;
        }
        node.value_range = Range::new(start, value_end);
        offset = end_of_white_space(self.bytes, offset);
        let before_comment = offset;
        offset = self.parse_comment(node, offset);
        if offset == before_comment || node.value_range.is_empty() {
            offset = self.parse_plain_continuation(node, offset);
        }
        offset
    }

    fn parse_plain_continuation(&self, node: &mut Node, start: usize) -> usize {
        let Context {
            indent,
            in_flow,
            flow_value,
            ..
        } = node.context;
        let mut offset = start;
        let mut value_end = None;
        while self.byte(offset) == Some(b'\n') {
            if at_document_boundary(self.bytes, offset + 1, None) {
                break;
            }
            let Some(end) = end_of_block_indent(self.bytes, indent, offset + 1) else {
                break;
            };
            match self.byte(end) {
                Some(b'#') => break,
                Some(b'\n') => offset = end,
                _ => {
                    let line_end = self.plain_end_of_line(end, in_flow, flow_value);
                    value_end = Some(line_end);
                    offset = line_end;
                }
            }
        }
        match value_end {
            Some(end) => {
                if node.value_range.is_empty() {
                    node.value_range.start = start;
                }
                let mut end = end;
                while end > node.value_range.start
                    && matches!(self.byte(end - 1), Some(b' ' | b'\t'))
                {
                    end -= 1;
                }
                node.value_range.end = end;
                end
            }
            None => start,
        }
    }

    fn parse_quote_double(&self, node: &mut Node, start: usize) -> usize {
        let mut offset = start + 1;
        while let Some(ch) = self.byte(offset) {
            if ch == b'"' {
                break;
            }
            offset += if ch == b'\\' { 2 } else { 1 };
        }
        let end = (offset + 1).min(self.bytes.len());
        node.value_range = Range::new(start, end);
        let offset = end_of_white_space(self.bytes, end);
        self.parse_comment(node, offset)
    }

    fn parse_quote_single(&self, node: &mut Node, start: usize) -> usize {
        let mut offset = start + 1;
        while let Some(ch) = self.byte(offset) {
            if ch == b'\'' {
                if self.byte(offset + 1) != Some(b'\'') {
                    break;
                }
                offset += 2;
            } else {
                offset += 1;
            }
        }
        let end = (offset + 1).min(self.bytes.len());
        node.value_range = Range::new(start, end);
        let offset = end_of_white_space(self.bytes, end);
        self.parse_comment(node, offset)
    }

    fn parse_block_value(&self, node: &mut Node, start: usize) -> usize {
        let mut header = BlockHeader::default();
        let mut offset = start + 1;
        let mut digits = String::new();
        while let Some(ch) = self.byte(offset) {
            match ch {
                b'-' => header.chomping = Chomp::Strip,
                b'+' => header.chomping = Chomp::Keep,
                b'0'..=b'9' => digits.push(ch as char),
                _ => break,
            }
            offset += 1;
        }
        header.block_indent = digits.parse::<usize>().ok().filter(|bi| *bi > 0);
        offset = end_of_white_space(self.bytes, offset);
        offset = self.parse_comment(node, offset);

        let indent = node.context.indent;
        let explicit = header.block_indent.is_some();
        let body_start = offset;
        let mut value_end = offset;
        let mut min_block_indent: isize = 1;
        while self.byte(offset) == Some(b'\n') {
            offset += 1;
            if at_document_boundary(self.bytes, offset, None) {
                break;
            }
            let Some(end) = end_of_block_indent(self.bytes, indent, offset) else {
                break;
            };
            let ch = self.byte(end);
            let line_indent = end as isize - (offset as isize + indent);
            match header.block_indent {
                None => {
                    if ch != Some(b'\n') {
                        if line_indent < min_block_indent && node.error.is_none() {
                            node.error = Some(YamlError::semantic(
                                "Block scalars with more-indented leading empty lines must use an \
                                 explicit indentation indicator",
                            ));
                        }
                        header.block_indent = Some(line_indent.max(0) as usize);
                    } else if line_indent > min_block_indent {
                        min_block_indent = line_indent;
                    }
                }
                Some(bi) => {
                    if ch.is_some() && ch != Some(b'\n') && line_indent < bi as isize {
                        if ch == Some(b'#') {
                            break;
                        }
                        if node.error.is_none() {
                            let what = if explicit {
                                "explicit indentation indicator"
                            } else {
                                "first line"
                            };
                            node.error = Some(YamlError::semantic(format!(
                                "Block scalars must not be less indented than their {what}"
                            )));
                        }
                    }
                }
            }
            if ch == Some(b'\n') {
                offset = end;
            } else {
                offset = end_of_line(self.bytes, end);
                value_end = offset;
            }
        }
        if header.chomping != Chomp::Keep {
            offset = if self.byte(value_end).is_some() {
                value_end + 1
            } else {
                value_end
            };
        }
        node.value_range = Range::new((body_start + 1).min(offset), offset);
        if let Some(err) = node.error.take() {
            node.error = Some(err.with_range(Range::new(start, offset)));
        }
        match &mut node.kind {
            NodeKind::BlockLiteral(h) | NodeKind::BlockFolded(h) => *h = header,
            _ => {}
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Node {
        Parser::new(src)
            .parse_node(Context::document(true, 0), 0)
            .unwrap()
    }

    #[test]
    fn test_plain_scalar_with_comment() {
        let src = "hello world # note\n";
        let node = parse(src);
        assert_eq!(node.kind, NodeKind::Plain);
        assert_eq!(node.raw_value(src), "hello world");
        assert_eq!(node.comment(src).as_deref(), Some(" note"));
    }

    #[test]
    fn test_multi_line_plain() {
        let src = "one\n two\n";
        let node = parse(src);
        assert_eq!(node.raw_value(src), "one\n two");
    }

    #[test]
    fn test_props_are_recorded_in_order() {
        let src = "&a !!str value";
        let node = parse(src);
        assert_eq!(node.props.len(), 2);
        assert_eq!(node.prop_value(src, 0, b'&', true), Some("a"));
        assert_eq!(node.prop_value(src, 1, b'!', false), Some("!!str"));
        assert_eq!(node.raw_value(src), "value");
        assert!(node.props[0].end <= node.props[1].start);
    }

    #[test]
    fn test_quoted_scalars() {
        let src = "\"a \\\" b\" # c";
        let node = parse(src);
        assert_eq!(node.kind, NodeKind::QuoteDouble);
        assert_eq!(node.raw_value(src), "\"a \\\" b\"");
        let src = "'it''s'";
        let node = parse(src);
        assert_eq!(node.kind, NodeKind::QuoteSingle);
        assert_eq!(node.raw_value(src), "'it''s'");
    }

    #[test]
    fn test_block_scalar_header() {
        let src = "|+\n  a\n\n";
        let node = parse(src);
        match node.kind {
            NodeKind::BlockLiteral(header) => {
                assert_eq!(header.chomping, Chomp::Keep);
                assert_eq!(header.block_indent, Some(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_alias() {
        let src = "*anchor";
        let node = parse(src);
        assert_eq!(node.kind, NodeKind::Alias);
        assert_eq!(node.raw_value(src), "anchor");
    }

    #[test]
    fn test_boundary_returns_none() {
        let parser = Parser::new("---\n");
        assert!(parser.parse_node(Context::document(true, 0), 0).is_none());
        assert!(parser.parse_node(Context::document(true, 0), 4).is_none());
    }
}

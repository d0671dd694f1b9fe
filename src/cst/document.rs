//! One document of a stream: directives, an optional `---` marker, content
//! nodes and an optional `...` marker.

use super::collection::grab_collection_end_comments;
use super::node::{Context, Node, NodeKind, NodeType};
use super::parser::Parser;
use super::range::Range;
use super::source::{
    at_document_boundary, end_of_indent, end_of_white_space, start_comment_or_end_blank_line,
};
use crate::error::YamlError;

const BOM: &str = "\u{feff}";

/// A CST document.
///
/// `error` holds a document-level shape error (missing directives-end
/// marker, junk after a document end marker). Errors of individual nodes
/// stay on those nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub directives: Vec<Node>,
    pub contents: Vec<Node>,
    pub directives_end_marker: Option<Range>,
    pub document_end_marker: Option<Range>,
    pub error: Option<YamlError>,
    pub range: Range,
    pub value_range: Range,
    /// Replaces the source text in [`Document::to_string`] when set.
    pub value: Option<String>,
}

impl Document {
    /// Parses one document starting at `start`, returning it and the offset
    /// just past it.
    pub fn parse(parser: &Parser<'_>, start: usize) -> (Document, usize) {
        let mut doc = Document::default();
        let mut offset = start;
        if parser.src.get(start..).is_some_and(|rest| rest.starts_with(BOM)) {
            offset += BOM.len();
        }
        offset = doc.parse_directives(parser, offset);
        offset = doc.parse_contents(parser, offset);
        doc.range = Range::new(start, offset);
        tracing::trace!(
            start,
            end = offset,
            directives = doc.directives.len(),
            contents = doc.contents.len(),
            "parsed document"
        );
        (doc, offset)
    }

    fn parse_directives(&mut self, parser: &Parser<'_>, start: usize) -> usize {
        let bytes = parser.bytes;
        let mut at_line_start = true;
        let mut has_directives = false;
        let mut offset = start;
        while !at_document_boundary(bytes, offset, Some(b'-')) {
            offset = start_comment_or_end_blank_line(bytes, offset);
            match parser.byte(offset) {
                Some(b'\n') => {
                    if at_line_start {
                        let blank = parser.parse_blank_line(offset);
                        offset = blank.range.end;
                        if offset < bytes.len() {
                            self.directives.push(blank);
                        }
                    } else {
                        offset += 1;
                        at_line_start = true;
                    }
                }
                Some(b'#') => {
                    let comment = parser.parse_comment_line(Context::default(), offset);
                    offset = comment.range.end;
                    self.directives.push(comment);
                    at_line_start = false;
                }
                Some(b'%') => {
                    let directive = parser.parse_directive(offset);
                    tracing::trace!(directive = %directive.range.slice(parser.src), "directive");
                    offset = directive.range.end;
                    self.directives.push(directive);
                    has_directives = true;
                    at_line_start = false;
                }
                _ => {
                    self.end_directives_without_marker(has_directives, offset);
                    return offset;
                }
            }
        }
        if parser.byte(offset).is_some() {
            self.directives_end_marker = Some(Range::new(offset, offset + 3));
            return offset + 3;
        }
        self.end_directives_without_marker(has_directives, offset);
        offset
    }

    /// Without a `---` marker, a prefix of comments and blank lines is
    /// document content rather than directives.
    fn end_directives_without_marker(&mut self, has_directives: bool, offset: usize) {
        if has_directives {
            self.error = Some(
                YamlError::semantic("Missing directives-end indicator line")
                    .with_range(Range::at(offset)),
            );
        } else if !self.directives.is_empty() {
            self.contents = std::mem::take(&mut self.directives);
        }
    }

    fn parse_contents(&mut self, parser: &Parser<'_>, start: usize) -> usize {
        let bytes = parser.bytes;
        let mut line_start = start;
        while line_start > 0 && bytes[line_start - 1] == b'-' {
            line_start -= 1;
        }
        let mut offset = end_of_white_space(bytes, start);
        let mut at_line_start = line_start == start;
        self.value_range = Range::at(offset);
        while !at_document_boundary(bytes, offset, Some(b'.')) {
            match parser.byte(offset) {
                Some(b'\n') => {
                    if at_line_start {
                        let blank = parser.parse_blank_line(offset);
                        offset = blank.range.end;
                        if offset < bytes.len() {
                            tracing::trace!(offset, "blank line");
                            self.contents.push(blank);
                        }
                    } else {
                        offset += 1;
                        at_line_start = true;
                    }
                    line_start = offset;
                }
                Some(b'#') => {
                    let comment = parser.parse_comment_line(Context::default(), offset);
                    offset = comment.range.end;
                    self.contents.push(comment);
                    at_line_start = false;
                }
                _ => {
                    let indent_end = end_of_indent(bytes, offset);
                    let context = Context::document(at_line_start, line_start);
                    let Some(mut node) = parser.parse_node(context, indent_end) else {
                        // at the next document start
                        self.value_range.end = indent_end;
                        return indent_end;
                    };
                    tracing::trace!(node_type = %node.node_type(), "document content");
                    offset = node.range.end;
                    at_line_start = false;
                    let end_comments = grab_collection_end_comments(&mut node);
                    self.contents.push(node);
                    if let Some(end_comments) = end_comments {
                        self.contents.extend(end_comments);
                    }
                }
            }
            offset = start_comment_or_end_blank_line(bytes, offset);
        }
        self.value_range.end = offset;
        if parser.byte(offset).is_some() {
            tracing::trace!(offset, "document end marker");
            self.document_end_marker = Some(Range::new(offset, offset + 3));
            offset += 3;
            if parser.byte(offset).is_some() {
                offset = end_of_white_space(bytes, offset);
                if parser.byte(offset) == Some(b'#') {
                    let comment = parser.parse_comment_line(Context::default(), offset);
                    offset = comment.range.end;
                    self.contents.push(comment);
                }
                match parser.byte(offset) {
                    Some(b'\n') => offset += 1,
                    None => {}
                    Some(_) => {
                        self.error = Some(
                            YamlError::syntax(
                                "Document end marker line cannot have a non-comment suffix",
                            )
                            .with_range(Range::at(offset)),
                        );
                    }
                }
            }
        }
        offset
    }

    /// Rebases every owned range in source order.
    pub fn set_orig_ranges(&mut self, cr: &[usize], mut offset: usize) -> usize {
        offset = self.range.set_orig_range(cr, offset);
        for node in &mut self.directives {
            offset = node.set_orig_ranges(cr, offset);
        }
        if let Some(marker) = &mut self.directives_end_marker {
            offset = marker.set_orig_range(cr, offset);
        }
        for node in &mut self.contents {
            offset = node.set_orig_ranges(cr, offset);
        }
        if let Some(marker) = &mut self.document_end_marker {
            offset = marker.set_orig_range(cr, offset);
        }
        offset
    }

    /// The document's source text, with a `---` line kept whenever it is
    /// needed to keep the directives and contents apart.
    #[must_use]
    pub fn to_string(&self, src: &str) -> String {
        if let Some(value) = &self.value {
            return value.clone();
        }
        let mut out: String = self.directives.iter().map(|n| n.source_text(src)).collect();
        if let Some(first) = self.contents.first() {
            if !self.directives.is_empty() || first.node_type() == NodeType::Comment {
                out.push_str("---\n");
            }
            out.extend(self.contents.iter().map(|n| n.source_text(src)));
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

impl<'a> Parser<'a> {
    /// Parses a `%NAME param...` line with an optional trailing comment.
    pub(crate) fn parse_directive(&self, start: usize) -> Node {
        let mut offset = start + 1;
        while !matches!(self.byte(offset), None | Some(b'\n' | b'\t' | b' ')) {
            offset += 1;
        }
        let name = Range::new(start + 1, offset).slice(self.src).to_string();
        let mut parameters = Vec::new();
        while !matches!(self.byte(offset), None | Some(b'\n' | b'#')) {
            offset = end_of_white_space(self.bytes, offset);
            let param_start = offset;
            while !matches!(self.byte(offset), None | Some(b'\n' | b'\t' | b' ')) {
                offset += 1;
            }
            if offset > param_start {
                parameters.push(Range::new(param_start, offset).slice(self.src).to_string());
            }
        }
        let mut node = Node::new(NodeKind::Directive { name, parameters }, Context::default());
        node.value_range = Range::new(start, offset);
        offset = self.parse_comment(&mut node, offset);
        node.range = Range::new(start, offset);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Document {
        Document::parse(&Parser::new(src), 0).0
    }

    #[test]
    fn test_directives_and_marker() {
        let src = "%YAML 1.2\n---\na: 1\n";
        let doc = parse(src);
        assert_eq!(doc.directives.len(), 1);
        match &doc.directives[0].kind {
            NodeKind::Directive { name, parameters } => {
                assert_eq!(name, "YAML");
                assert_eq!(parameters, &vec!["1.2".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(doc.directives_end_marker, Some(Range::new(10, 13)));
        assert_eq!(doc.contents.len(), 1);
        assert!(doc.error.is_none());
    }

    #[test]
    fn test_missing_directives_end() {
        let doc = parse("%YAML 1.2\na: 1\n");
        assert_eq!(
            doc.error.as_ref().map(YamlError::message),
            Some("Missing directives-end indicator line")
        );
    }

    #[test]
    fn test_leading_comments_are_contents() {
        let doc = parse("# c\n\na: 1\n");
        assert!(doc.directives.is_empty());
        let types: Vec<NodeType> = doc.contents.iter().map(Node::node_type).collect();
        assert_eq!(types, vec![NodeType::Comment, NodeType::BlankLine, NodeType::Map]);
    }

    #[test]
    fn test_end_marker_suffix() {
        let doc = parse("a\n... # done\n");
        assert!(doc.error.is_none());
        assert!(doc.document_end_marker.is_some());
        let doc = parse("a\n... x\n");
        assert_eq!(
            doc.error.as_ref().map(YamlError::message),
            Some("Document end marker line cannot have a non-comment suffix")
        );
    }

    #[test]
    fn test_to_string_is_lossless() {
        let src = "# head\nkey: value # note\n\nlist:\n  - a\n  - b\n";
        let doc = parse(src);
        assert_eq!(doc.to_string(src), format!("---\n{src}"));
        let src = "a: 1\n";
        assert_eq!(parse(src).to_string(src), src);
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let src = "\u{feff}a: 1\n";
        let doc = parse(src);
        assert_eq!(doc.contents.len(), 1);
        assert_eq!(doc.contents[0].node_type(), NodeType::Map);
    }
}

//! CST node types.
//!
//! Every node is a closed tagged variant ([`NodeKind`]) sharing a common
//! header: its full `range` (props included), its `value_range` (props
//! excluded), the ordered `props` prefix markers (`&anchor`, `!tag`,
//! `# comment`) and the parse [`Context`] it was created in.

use super::range::Range;
use super::source;
use crate::error::YamlError;
use std::fmt;

/// The type tag of a CST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Alias,
    BlankLine,
    BlockFolded,
    BlockLiteral,
    Comment,
    Directive,
    Document,
    FlowMap,
    FlowSeq,
    Map,
    MapKey,
    MapValue,
    Plain,
    QuoteDouble,
    QuoteSingle,
    Seq,
    SeqItem,
}

impl NodeType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeType::Alias => "ALIAS",
            NodeType::BlankLine => "BLANK_LINE",
            NodeType::BlockFolded => "BLOCK_FOLDED",
            NodeType::BlockLiteral => "BLOCK_LITERAL",
            NodeType::Comment => "COMMENT",
            NodeType::Directive => "DIRECTIVE",
            NodeType::Document => "DOCUMENT",
            NodeType::FlowMap => "FLOW_MAP",
            NodeType::FlowSeq => "FLOW_SEQ",
            NodeType::Map => "MAP",
            NodeType::MapKey => "MAP_KEY",
            NodeType::MapValue => "MAP_VALUE",
            NodeType::Plain => "PLAIN",
            NodeType::QuoteDouble => "QUOTE_DOUBLE",
            NodeType::QuoteSingle => "QUOTE_SINGLE",
            NodeType::Seq => "SEQ",
            NodeType::SeqItem => "SEQ_ITEM",
        }
    }

    /// `true` for block and flow mappings.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, NodeType::Map | NodeType::FlowMap)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parse state a node was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub at_line_start: bool,
    pub in_collection: bool,
    pub in_flow: bool,
    /// Indentation of the enclosing collection, `-1` at document level.
    pub indent: isize,
    pub line_start: usize,
    /// Set for flow mapping values, where a plain scalar must stop before
    /// a following implicit key.
    pub flow_value: bool,
    /// Whether a `-` at the same indentation continues this node. Cleared
    /// for the contents of a line-initial sequence item.
    pub indicator_as_indent: bool,
}

impl Context {
    /// The context of a document's top-level content.
    #[must_use]
    pub fn document(at_line_start: bool, line_start: usize) -> Self {
        Context {
            at_line_start,
            in_collection: false,
            in_flow: false,
            indent: -1,
            line_start,
            flow_value: false,
            indicator_as_indent: true,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::document(true, 0)
    }
}

/// A block collection item indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// `?`
    Key,
    /// `:`
    Value,
    /// `-`
    SeqItem,
}

impl Indicator {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Indicator::Key => '?',
            Indicator::Value => ':',
            Indicator::SeqItem => '-',
        }
    }
}

/// Block scalar chomping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chomp {
    #[default]
    Clip,
    Strip,
    Keep,
}

/// The header of a `|` or `>` block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub chomping: Chomp,
    /// Explicit indentation indicator, relative to the parent indent.
    pub block_indent: Option<usize>,
}

/// An entry of a flow collection: either an indicator or a node.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowItem {
    Char { ch: char, offset: usize, orig_offset: Option<usize> },
    Node(Node),
}

impl FlowItem {
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            FlowItem::Char { ch, .. } => Some(*ch),
            FlowItem::Node(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    BlankLine,
    Comment,
    Directive { name: String, parameters: Vec<String> },
    Alias,
    Plain,
    QuoteDouble,
    QuoteSingle,
    BlockLiteral(BlockHeader),
    BlockFolded(BlockHeader),
    Map(Vec<Node>),
    Seq(Vec<Node>),
    FlowMap(Vec<FlowItem>),
    FlowSeq(Vec<FlowItem>),
    CollectionItem { indicator: Indicator, node: Option<Box<Node>> },
}

/// A concrete syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range,
    pub value_range: Range,
    pub props: Vec<Range>,
    pub context: Context,
    pub error: Option<YamlError>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, context: Context) -> Self {
        Node {
            kind,
            range: Range::default(),
            value_range: Range::default(),
            props: Vec::new(),
            context,
            error: None,
        }
    }

    /// A zero-width plain scalar at `offset`, used as an anchor for comments
    /// on an otherwise empty value.
    #[must_use]
    pub fn placeholder(offset: usize, orig: Option<usize>, context: Context) -> Self {
        let mut range = Range::at(offset);
        range.orig_start = orig;
        range.orig_end = orig;
        let mut node = Node::new(NodeKind::Plain, context);
        node.range = range;
        node.value_range = range;
        node
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::BlankLine => NodeType::BlankLine,
            NodeKind::Comment => NodeType::Comment,
            NodeKind::Directive { .. } => NodeType::Directive,
            NodeKind::Alias => NodeType::Alias,
            NodeKind::Plain => NodeType::Plain,
            NodeKind::QuoteDouble => NodeType::QuoteDouble,
            NodeKind::QuoteSingle => NodeType::QuoteSingle,
            NodeKind::BlockLiteral(_) => NodeType::BlockLiteral,
            NodeKind::BlockFolded(_) => NodeType::BlockFolded,
            NodeKind::Map(_) => NodeType::Map,
            NodeKind::Seq(_) => NodeType::Seq,
            NodeKind::FlowMap(_) => NodeType::FlowMap,
            NodeKind::FlowSeq(_) => NodeType::FlowSeq,
            NodeKind::CollectionItem { indicator, .. } => match indicator {
                Indicator::Key => NodeType::MapKey,
                Indicator::Value => NodeType::MapValue,
                Indicator::SeqItem => NodeType::SeqItem,
            },
        }
    }

    /// `true` for nodes that carry a value (everything but blank lines,
    /// comments and directives).
    #[must_use]
    pub fn has_value(&self) -> bool {
        !matches!(
            self.kind,
            NodeKind::BlankLine | NodeKind::Comment | NodeKind::Directive { .. }
        )
    }

    /// `true` for the scalar kinds.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Plain
                | NodeKind::QuoteDouble
                | NodeKind::QuoteSingle
                | NodeKind::BlockLiteral(_)
                | NodeKind::BlockFolded(_)
        )
    }

    /// `true` when the node's range already covers the blank lines after it,
    /// as for a keep-chomped block scalar.
    #[must_use]
    pub fn includes_trailing_lines(&self) -> bool {
        match &self.kind {
            NodeKind::BlockLiteral(header) | NodeKind::BlockFolded(header) => {
                header.chomping == Chomp::Keep
            }
            NodeKind::Map(items) | NodeKind::Seq(items) => {
                items.last().is_some_and(Node::includes_trailing_lines)
            }
            NodeKind::CollectionItem { node, .. } => {
                node.as_deref().is_some_and(Node::includes_trailing_lines)
            }
            _ => false,
        }
    }

    /// `true` for quoted scalars and flow collections, after which a flow
    /// `:` needs no following space.
    #[must_use]
    pub fn is_json_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::QuoteDouble
                | NodeKind::QuoteSingle
                | NodeKind::FlowMap(_)
                | NodeKind::FlowSeq(_)
        )
    }

    /// The collection item's child node, if this is a collection item.
    #[must_use]
    pub fn item_node(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::CollectionItem { node, .. } => node.as_deref(),
            _ => None,
        }
    }

    /// The text of all comment props, without their `#`, newline-joined.
    #[must_use]
    pub fn comment(&self, src: &str) -> Option<String> {
        let comments: Vec<&str> = self
            .props
            .iter()
            .filter(|p| src.as_bytes().get(p.start) == Some(&b'#'))
            .map(|p| Range::new(p.start + 1, p.end).slice(src))
            .collect();
        if comments.is_empty() {
            None
        } else {
            Some(comments.join("\n"))
        }
    }

    /// The text of the prop at `idx` if it starts with `marker`, without the
    /// marker when `strip` is set.
    #[must_use]
    pub fn prop_value<'a>(
        &self,
        src: &'a str,
        idx: usize,
        marker: u8,
        strip: bool,
    ) -> Option<&'a str> {
        let prop = self.props.get(idx)?;
        if src.as_bytes().get(prop.start) != Some(&marker) {
            return None;
        }
        let start = if strip { prop.start + 1 } else { prop.start };
        Some(Range::new(start, prop.end).slice(src))
    }

    /// `true` if any anchor or tag prop is present.
    #[must_use]
    pub fn has_props(&self, src: &str) -> bool {
        self.props
            .iter()
            .any(|p| matches!(src.as_bytes().get(p.start), Some(b'&' | b'!')))
    }

    /// The raw text of the value, without props or trailing comment.
    #[must_use]
    pub fn raw_value<'a>(&self, src: &'a str) -> &'a str {
        self.value_range.slice(src)
    }

    #[must_use]
    pub fn value_range_contains_newline(&self, src: &str) -> bool {
        self.raw_value(src).contains('\n')
    }

    /// The lossless source text of this node, terminated by a newline when
    /// the source line ends after it.
    #[must_use]
    pub fn source_text(&self, src: &str) -> String {
        add_string_terminator(src, self.range.end, self.range.slice(src))
    }

    /// Rebases every owned range. See [`Range::set_orig_range`].
    pub fn set_orig_ranges(&mut self, cr: &[usize], mut offset: usize) -> usize {
        offset = self.range.set_orig_range(cr, offset);
        self.value_range.set_orig_range(cr, offset);
        for prop in &mut self.props {
            prop.set_orig_range(cr, offset);
        }
        match &mut self.kind {
            NodeKind::Map(items) | NodeKind::Seq(items) => {
                for item in items {
                    offset = item.set_orig_ranges(cr, offset);
                }
            }
            NodeKind::FlowMap(items) | NodeKind::FlowSeq(items) => {
                for item in items {
                    match item {
                        FlowItem::Node(node) => offset = node.set_orig_ranges(cr, offset),
                        FlowItem::Char {
                            offset: at,
                            orig_offset,
                            ..
                        } => {
                            let mut i = offset;
                            while i < cr.len() && cr[i] <= *at {
                                i += 1;
                            }
                            *orig_offset = Some(*at + i);
                            offset = i;
                        }
                    }
                }
            }
            NodeKind::CollectionItem { node: Some(node), .. } => {
                offset = node.set_orig_ranges(cr, offset);
            }
            _ => {}
        }
        offset
    }
}

pub(crate) fn add_string_terminator(src: &str, offset: usize, text: &str) -> String {
    if text.ends_with('\n') {
        return text.to_string();
    }
    let bytes = src.as_bytes();
    let next = source::end_of_white_space(bytes, offset);
    if next >= bytes.len() || bytes[next] == b'\n' {
        format!("{text}\n")
    } else {
        text.to_string()
    }
}

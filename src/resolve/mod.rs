//! Turns CST nodes into logical nodes.
//!
//! A [`Resolver`] walks one document's CST. It reads each node's props
//! (anchor, tag, comments), dispatches on the node kind and collects every
//! problem it finds into its error and warning lists. It never stops early:
//! a node that cannot be resolved becomes a null scalar and resolution
//! carries on with its siblings.

mod map;
mod seq;
mod tags;
mod utils;

pub(crate) use tags::{resolve_plain_scalar, CORE_PREFIX};

use crate::anchors::Anchors;
use crate::cst::{self, NodeKind, NodeType, Range};
use crate::document::TagPrefix;
use crate::error::{Warning, YamlError};
use crate::options::Options;
use crate::value::{Alias, Node, Scalar, ScalarStyle, ScalarValue};

/// How a node's explicit tag was written.
enum TagName {
    /// A lone `!`: scalars are strings, collections keep their kind.
    NonSpecific,
    /// A fully expanded tag, e.g. `tag:yaml.org,2002:str`.
    Named(String),
}

pub(crate) struct Resolver<'a> {
    pub(crate) src: &'a str,
    pub(crate) options: &'a Options,
    /// Whether `<<` keys are merge keys in this document.
    pub(crate) merge: bool,
    pub(crate) tag_prefixes: &'a [TagPrefix],
    pub(crate) anchors: Anchors,
    pub(crate) errors: Vec<YamlError>,
    pub(crate) warnings: Vec<Warning>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        src: &'a str,
        options: &'a Options,
        merge: bool,
        tag_prefixes: &'a [TagPrefix],
    ) -> Self {
        Resolver {
            src,
            options,
            merge,
            tag_prefixes,
            anchors: Anchors::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn resolve_node(&mut self, node: &cst::Node) -> Node {
        self.resolve_with_props(node, &[])
    }

    /// Resolves the child of a collection item, which also owns the props
    /// written between the indicator and the child.
    pub(crate) fn resolve_item_node(&mut self, item: &cst::Node) -> Option<Node> {
        let child = item.item_node()?;
        Some(self.resolve_with_props(child, &item.props))
    }

    /// Queues the error a CST node recorded while it was parsed.
    pub(crate) fn push_node_error(&mut self, node: &cst::Node) {
        if let Some(err) = &node.error {
            let err = match err.range() {
                Some(_) => err.clone(),
                None => err.clone().with_range(node.range),
            };
            self.errors.push(err);
        }
    }

    fn resolve_with_props(&mut self, node: &cst::Node, item_props: &[Range]) -> Node {
        let src = self.src;
        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut anchor: Option<&str> = None;
        let mut tag: Option<&str> = None;
        for prop in item_props.iter().chain(node.props.iter()) {
            let text = prop.slice(src);
            match text.as_bytes().first() {
                Some(b'#') => {
                    if comment_follows_value(node, *prop) {
                        after.push(&text[1..]);
                    } else {
                        before.push(&text[1..]);
                    }
                }
                Some(b'&') => {
                    if anchor.is_some() {
                        self.errors.push(
                            YamlError::semantic("A node can have at most one anchor")
                                .with_range(node.range),
                        );
                    } else {
                        anchor = Some(&text[1..]);
                    }
                }
                Some(b'!') => {
                    if tag.is_some() {
                        self.errors.push(
                            YamlError::semantic("A node can have at most one tag")
                                .with_range(node.range),
                        );
                    } else {
                        tag = Some(text);
                    }
                }
                _ => {}
            }
        }
        self.push_node_error(node);

        let mut res = if node.kind == NodeKind::Alias {
            self.resolve_alias(node, anchor.is_some() || tag.is_some())
        } else {
            if let Some(name) = anchor {
                self.anchors.define(name, node.node_type());
            }
            let mut res = self.resolve_value(node, tag);
            res.anchor = anchor.map(str::to_string);
            res
        };
        res.range = Some(node.range);
        if !before.is_empty() {
            let cb = before.join("\n");
            res.comment_before = Some(match res.comment_before.take() {
                Some(existing) => format!("{existing}\n{cb}"),
                None => cb,
            });
        }
        if !after.is_empty() {
            let ca = after.join("\n");
            res.comment = Some(match res.comment.take() {
                Some(existing) => format!("{existing}\n{ca}"),
                None => ca,
            });
        }
        res
    }

    fn resolve_alias(&mut self, node: &cst::Node, has_props: bool) -> Node {
        if has_props {
            self.errors.push(
                YamlError::semantic("An alias node must not specify any properties")
                    .with_range(node.range),
            );
        }
        let name = node.raw_value(self.src);
        match self.anchors.lookup(name) {
            Some(id) => Node::from(Alias {
                source: name.to_string(),
                target: Some(id),
            }),
            None => {
                self.errors.push(
                    YamlError::reference(format!("Aliased anchor not found: {name}"))
                        .with_range(node.range),
                );
                Node::null()
            }
        }
    }

    fn resolve_value(&mut self, node: &cst::Node, tag: Option<&str>) -> Node {
        match tag.and_then(|raw| self.resolve_tag_name(node, raw)) {
            Some(TagName::Named(name)) => {
                let mut res = self.resolve_by_tag(node, &name);
                if !res.is_null() || node.is_scalar() {
                    res.tag = Some(name);
                }
                res
            }
            Some(TagName::NonSpecific) if node.is_scalar() => {
                self.resolve_string(node)
            }
            _ => self.resolve_default(node),
        }
    }

    /// Resolution without an explicit tag: collections by kind, quoted and
    /// block scalars as strings, plain scalars through the core schema.
    fn resolve_default(&mut self, node: &cst::Node) -> Node {
        match &node.kind {
            NodeKind::Map(_) | NodeKind::FlowMap(_) => self.resolve_map_node(node),
            NodeKind::Seq(_) | NodeKind::FlowSeq(_) => self.resolve_seq_node(node),
            NodeKind::Plain => {
                let Some(value) = self.str_value(node) else {
                    return Node::null();
                };
                let mut scalar = Scalar::new(resolve_plain_scalar(&value));
                scalar.style = Some(ScalarStyle::Plain);
                let raw = node.raw_value(self.src);
                if !raw.contains('\n') {
                    scalar.source = Some(raw.to_string());
                }
                Node::from(scalar)
            }
            NodeKind::QuoteDouble
            | NodeKind::QuoteSingle
            | NodeKind::BlockLiteral(_)
            | NodeKind::BlockFolded(_) => self.resolve_string(node),
            _ => {
                self.errors.push(
                    YamlError::syntax(format!("Failed to resolve {} node here", node.node_type()))
                        .with_range(node.range),
                );
                Node::null()
            }
        }
    }

    pub(crate) fn resolve_map_node(&mut self, node: &cst::Node) -> Node {
        match self.parse_map(node) {
            Some((map, comment)) => {
                let mut res = Node::from(map);
                res.comment = comment;
                res
            }
            None => Node::null(),
        }
    }

    pub(crate) fn resolve_seq_node(&mut self, node: &cst::Node) -> Node {
        match self.parse_seq(node) {
            Some((seq, comment)) => {
                let mut res = Node::from(seq);
                res.comment = comment;
                res
            }
            None => Node::null(),
        }
    }

    /// A scalar node as a string, keeping its source style.
    fn resolve_string(&mut self, node: &cst::Node) -> Node {
        let value = self.str_value(node).unwrap_or_default();
        let mut scalar = Scalar::new(ScalarValue::String(value));
        scalar.style = scalar_style(node);
        Node::from(scalar)
    }

    /// The cooked string of a scalar node; its errors are queued.
    fn str_value(&mut self, node: &cst::Node) -> Option<String> {
        let value = node.str_value(self.src)?;
        self.errors.extend(value.errors);
        Some(value.value)
    }

    /// Expands `raw` (`!!str`, `!e!foo`, `!<tag:x>`, `!local`) using the
    /// document's `%TAG` handles and the two default handles.
    fn resolve_tag_name(&mut self, node: &cst::Node, raw: &str) -> Option<TagName> {
        if raw == "!" {
            return Some(TagName::NonSpecific);
        }
        if let Some(verbatim) = raw.strip_prefix("!<") {
            return Some(TagName::Named(verbatim.trim_end_matches('>').to_string()));
        }
        let (handle, suffix) = if let Some(suffix) = raw.strip_prefix("!!") {
            ("!!", suffix)
        } else {
            match raw[1..].find('!') {
                Some(i) => raw.split_at(i + 2),
                None => ("!", &raw[1..]),
            }
        };
        let declared = self
            .tag_prefixes
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.prefix.as_str());
        let prefix = declared.or(match handle {
            "!" => Some("!"),
            "!!" => Some(CORE_PREFIX),
            _ => None,
        });
        match prefix {
            Some(prefix) => Some(TagName::Named(format!("{prefix}{suffix}"))),
            None => {
                self.errors.push(
                    YamlError::semantic(format!(
                        "The {handle} tag handle is non-default and was not declared."
                    ))
                    .with_range(node.range),
                );
                None
            }
        }
    }

    fn resolve_by_tag(&mut self, node: &cst::Node, name: &str) -> Node {
        let is_map = node.node_type().is_map();
        let is_seq = matches!(node.node_type(), NodeType::Seq | NodeType::FlowSeq);
        let core = name.strip_prefix(CORE_PREFIX);
        match core {
            Some("map") => {
                if is_map {
                    return self.resolve_map_node(node);
                }
                let message =
                    format!("A {} node cannot be resolved as a mapping", node.node_type());
                self.errors
                    .push(YamlError::syntax(message).with_range(node.range));
                return Node::null();
            }
            Some("seq") => {
                if is_seq {
                    return self.resolve_seq_node(node);
                }
                let message =
                    format!("A {} node cannot be resolved as a sequence", node.node_type());
                self.errors
                    .push(YamlError::syntax(message).with_range(node.range));
                return Node::null();
            }
            Some(kind @ ("str" | "null" | "bool" | "int" | "float")) if node.is_scalar() => {
                let value = self.str_value(node).unwrap_or_default();
                let typed = tags::resolve_typed_scalar(kind, &value);
                if typed.is_none() {
                    self.warn_fallback(node, name);
                }
                let mut scalar = Scalar::new(typed.unwrap_or(ScalarValue::String(value)));
                scalar.style = scalar_style(node);
                return Node::from(scalar);
            }
            _ => {}
        }
        self.warn_fallback(node, name);
        if node.is_scalar() {
            self.resolve_string(node)
        } else {
            self.resolve_default(node)
        }
    }

    fn warn_fallback(&mut self, node: &cst::Node, name: &str) {
        let fallback = if node.node_type().is_map() {
            "map"
        } else if matches!(node.node_type(), NodeType::Seq | NodeType::FlowSeq) {
            "seq"
        } else {
            "str"
        };
        self.warnings.push(Warning::new(
            format!("The tag {name} is unavailable, falling back to {CORE_PREFIX}{fallback}"),
            Some(node.range),
        ));
    }
}

/// Whether a comment prop comes after the start of the node's value, as
/// the trailing comment of a scalar or the header comment of a block
/// scalar does.
fn comment_follows_value(node: &cst::Node, prop: Range) -> bool {
    match node.kind {
        NodeKind::BlockLiteral(_) | NodeKind::BlockFolded(_) => {
            prop.end + 1 >= node.value_range.start
        }
        _ => prop.start > node.value_range.start,
    }
}

fn scalar_style(node: &cst::Node) -> Option<ScalarStyle> {
    match node.kind {
        NodeKind::Plain => Some(ScalarStyle::Plain),
        NodeKind::QuoteDouble => Some(ScalarStyle::QuoteDouble),
        NodeKind::QuoteSingle => Some(ScalarStyle::QuoteSingle),
        NodeKind::BlockLiteral(_) => Some(ScalarStyle::BlockLiteral),
        NodeKind::BlockFolded(_) => Some(ScalarStyle::BlockFolded),
        _ => None,
    }
}

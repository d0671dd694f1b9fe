//! Turning logical nodes back into text.
//!
//! Stringification is a recursive walk. Each call returns a [`Stringified`]
//! rather than reporting through callbacks: the text, whether the node's
//! trailing comment was already written into it, and whether the text ends
//! in a keep-chomped block scalar whose trailing blank lines must not be
//! doubled by the caller.
//!
//! Scalars are written in their source style when that style can still
//! represent their value, and plain scalars reuse their source text when it
//! still resolves to the same value. Everything else falls back to the
//! simplest style that reads back unchanged.
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::stringify::StringifyContext;
//! use lossless_yaml::{Options, Pair};
//!
//! let options = Options::new();
//! let ctx = StringifyContext::new(&options, &[]);
//!
//! let pair = Pair::new("name", "demo");
//! assert_eq!(pair.stringify(&ctx).text, "name: demo");
//!
//! let mut pair = Pair::new("port", "8080");
//! pair.comment = Some(" as a string".to_string());
//! assert_eq!(pair.stringify(&ctx).text, "port: # as a string\n  \"8080\"");
//! ```

use crate::document::TagPrefix;
use crate::options::Options;
use crate::resolve::{resolve_plain_scalar, CORE_PREFIX};
use crate::value::{Map, Node, Number, Pair, Scalar, ScalarStyle, ScalarValue, Seq, Value};

/// Flow collections longer than this are split over several lines.
const MAX_FLOW_LINE: usize = 60;

/// The position a node is written at.
#[derive(Clone, Debug)]
pub struct StringifyContext<'a> {
    pub options: &'a Options,
    pub tag_prefixes: &'a [TagPrefix],
    /// Indentation of the lines after the first.
    pub indent: String,
    /// Writing an implicit key, which must fit on one line.
    pub implicit_key: bool,
    pub in_flow: bool,
    /// Every value of the enclosing map is null, so pairs are written as
    /// `? key` entries.
    pub all_null_values: bool,
    /// Column of the enclosing block collection's items, `-1` at document
    /// level. Block scalars measure explicit indentation from it.
    pub column: isize,
}

impl<'a> StringifyContext<'a> {
    #[must_use]
    pub fn new(options: &'a Options, tag_prefixes: &'a [TagPrefix]) -> Self {
        StringifyContext {
            options,
            tag_prefixes,
            indent: String::new(),
            implicit_key: false,
            in_flow: false,
            all_null_values: false,
            column: -1,
        }
    }

    fn indent_step(&self) -> String {
        " ".repeat(self.options.indent)
    }

    fn deeper(&self) -> Self {
        StringifyContext {
            indent: format!("{}{}", self.indent, self.indent_step()),
            ..self.clone()
        }
    }
}

/// The result of stringifying one node or pair.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Stringified {
    pub text: String,
    /// The node's own trailing comment is already part of `text`.
    pub comment_consumed: bool,
    /// `text` ends in a keep-chomped block scalar; its trailing blank lines
    /// are in place, so no blank line should be added after it.
    pub chomp_keep: bool,
}

impl Stringified {
    fn new(text: impl Into<String>) -> Self {
        Stringified {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// `s` followed by `comment`, on the same line when the comment has one
/// line, otherwise as `#` lines after it.
pub(crate) fn add_comment(s: &str, indent: &str, comment: Option<&str>) -> String {
    match comment {
        None => s.to_string(),
        Some(c) if !c.contains('\n') => format!("{s} #{c}"),
        Some(c) => format!("{s}\n{}", comment_lines(c, indent)),
    }
}

/// Comment text as `#` lines at `indent`.
pub(crate) fn comment_lines(comment: &str, indent: &str) -> String {
    comment
        .split('\n')
        .map(|line| format!("{indent}#{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Node {
    /// Writes this node at the position described by `ctx`. The first line
    /// is not indented; later lines start with `ctx.indent`. Comments
    /// before the node are left to the caller.
    #[must_use]
    pub fn stringify(&self, ctx: &StringifyContext<'_>) -> Stringified {
        let out = match &self.value {
            Value::Scalar(scalar) => stringify_scalar(scalar, self.comment.as_deref(), ctx),
            Value::Alias(alias) => {
                let text = if ctx.implicit_key {
                    format!("*{} ", alias.source)
                } else {
                    format!("*{}", alias.source)
                };
                Stringified::new(text)
            }
            Value::Map(map) => stringify_map(self, map, ctx),
            Value::Seq(seq) => stringify_seq(self, seq, ctx),
        };
        let props = self.props_text(ctx);
        if props.is_empty() {
            return out;
        }
        let inline = !self.is_collection() || out.text.starts_with(['{', '[']);
        let text = if inline {
            format!("{props} {}", out.text)
        } else {
            format!("{props}\n{}{}", ctx.indent, out.text)
        };
        Stringified { text, ..out }
    }

    /// `&anchor !tag`, with the tag left out when it is the one the value
    /// would resolve to anyway.
    fn props_text(&self, ctx: &StringifyContext<'_>) -> String {
        let mut props = Vec::new();
        if let Some(anchor) = &self.anchor {
            props.push(format!("&{anchor}"));
        }
        if let Some(tag) = &self.tag {
            if !self.has_default_tag(tag) {
                props.push(short_tag(tag, ctx.tag_prefixes));
            }
        }
        props.join(" ")
    }

    fn has_default_tag(&self, tag: &str) -> bool {
        let Some(name) = tag.strip_prefix(CORE_PREFIX) else {
            return false;
        };
        match &self.value {
            Value::Map(_) => name == "map",
            Value::Seq(_) => name == "seq",
            Value::Alias(_) => false,
            Value::Scalar(scalar) => match &scalar.value {
                ScalarValue::Null => name == "null",
                ScalarValue::Bool(_) => name == "bool",
                ScalarValue::Number(Number::Integer(_)) => name == "int",
                ScalarValue::Number(_) => name == "float",
                ScalarValue::String(_) => name == "str",
            },
        }
    }
}

fn short_tag(tag: &str, prefixes: &[TagPrefix]) -> String {
    let declared = prefixes
        .iter()
        .filter(|p| tag.len() > p.prefix.len())
        .find_map(|p| {
            tag.strip_prefix(p.prefix.as_str())
                .map(|suffix| format!("{}{suffix}", p.handle))
        });
    if let Some(short) = declared {
        return short;
    }
    if let Some(suffix) = tag.strip_prefix(CORE_PREFIX) {
        return format!("!!{suffix}");
    }
    if tag.starts_with('!') {
        return tag.to_string();
    }
    format!("!<{tag}>")
}

impl Pair {
    /// Writes the pair at the position described by `ctx`.
    ///
    /// The key is written in explicit `? key` form when it is missing or
    /// null, carries a comment, or is a collection. Otherwise the compact
    /// `key: value` form is used.
    #[must_use]
    pub fn stringify(&self, ctx: &StringifyContext<'_>) -> Stringified {
        let key = self.key.as_ref();
        let mut key_comment = key.and_then(|k| k.comment.as_deref());
        let explicit_key = match key {
            None => true,
            Some(k) => k.is_null() || key_comment.is_some() || k.is_collection(),
        };
        let mut key_ctx = ctx.deeper();
        key_ctx.implicit_key = !explicit_key;

        let key_out = match key {
            Some(k) => k.stringify(&key_ctx),
            None => Stringified::default(),
        };
        if key_out.comment_consumed {
            key_comment = None;
        }
        let key_text = if key_out.text.is_empty() && !explicit_key {
            ctx.options.null_str.clone()
        } else {
            key_out.text
        };
        let mut s = add_comment(&key_text, &key_ctx.indent, key_comment);

        if ctx.all_null_values {
            let chomp_keep = key_out.chomp_keep && key_comment.is_none() && self.comment.is_none();
            if let Some(c) = &self.comment {
                s = add_comment(&s, &key_ctx.indent, Some(c));
            }
            let text = if s.is_empty() {
                "?".to_string()
            } else if ctx.in_flow {
                s
            } else {
                format!("? {s}")
            };
            return Stringified {
                text,
                comment_consumed: true,
                chomp_keep,
            };
        }

        s = if !explicit_key {
            format!("{s}:")
        } else if s.is_empty() {
            format!("?\n{}:", ctx.indent)
        } else {
            format!("? {s}\n{}:", ctx.indent)
        };
        if let Some(c) = &self.comment {
            s = add_comment(&s, &key_ctx.indent, Some(c));
        }

        let value = self.value.as_ref();
        let mut value_comment_before = String::new();
        let mut value_comment = None;
        if let Some(v) = value {
            if v.space_before {
                value_comment_before.push('\n');
            }
            if let Some(cb) = &v.comment_before {
                value_comment_before.push('\n');
                value_comment_before.push_str(&comment_lines(cb, &key_ctx.indent));
            }
            value_comment = v.comment.as_deref();
        }
        let mut value_ctx = key_ctx.clone();
        value_ctx.implicit_key = false;
        let value_out = match value {
            Some(v) => v.stringify(&value_ctx),
            None => Stringified::default(),
        };
        if value_out.comment_consumed {
            value_comment = None;
        }
        let value_text = if value_out.text.is_empty() && !value_comment_before.is_empty() {
            ctx.options.null_str.clone()
        } else {
            value_out.text
        };
        let chomp_keep = value_out.chomp_keep && value_comment.is_none();

        let text = if value_text.is_empty() {
            add_comment(&s, &key_ctx.indent, value_comment)
        } else {
            let ws = if !value_comment_before.is_empty() || self.comment.is_some() {
                format!("{value_comment_before}\n{}", key_ctx.indent)
            } else if !explicit_key && value.is_some_and(Node::is_collection) {
                let flow = value_text.starts_with(['[', '{']);
                if !flow || value_text.contains('\n') {
                    format!("\n{}", key_ctx.indent)
                } else {
                    " ".to_string()
                }
            } else {
                " ".to_string()
            };
            add_comment(&format!("{s}{ws}{value_text}"), &key_ctx.indent, value_comment)
        };
        Stringified {
            text,
            comment_consumed: true,
            chomp_keep,
        }
    }
}

/// An entry of a collection being written.
enum Item<'n> {
    Pair(&'n Pair),
    Node(&'n Node),
}

impl Item<'_> {
    fn space_before(&self) -> bool {
        match self {
            Item::Pair(pair) => {
                pair.space_before || pair.key.as_ref().is_some_and(|k| k.space_before)
            }
            Item::Node(node) => node.space_before,
        }
    }

    fn comment_before(&self) -> Option<&str> {
        match self {
            Item::Pair(pair) => pair.comment_before(),
            Item::Node(node) => node.comment_before.as_deref(),
        }
    }

    fn comment(&self) -> Option<&str> {
        match self {
            Item::Pair(pair) => pair.comment.as_deref(),
            Item::Node(node) => node.comment.as_deref(),
        }
    }

    fn stringify(&self, ctx: &StringifyContext<'_>) -> Stringified {
        match self {
            Item::Pair(pair) => pair.stringify(ctx),
            Item::Node(node) => node.stringify(ctx),
        }
    }
}

fn stringify_map(node: &Node, map: &Map, ctx: &StringifyContext<'_>) -> Stringified {
    let items: Vec<Item<'_>> = map.items.iter().map(|item| Item::Pair(item.pair())).collect();
    let all_null_values =
        !map.is_empty() && map.pairs().all(|p| p.value.as_ref().map_or(true, Node::is_null));
    stringify_collection(node, &items, map.flow, true, all_null_values, ctx)
}

fn stringify_seq(node: &Node, seq: &Seq, ctx: &StringifyContext<'_>) -> Stringified {
    let items: Vec<Item<'_>> = seq.items.iter().map(Item::Node).collect();
    stringify_collection(node, &items, seq.flow, false, false, ctx)
}

/// Writes a block or flow collection, with the comment lines and blank
/// lines recorded before each item.
fn stringify_collection(
    node: &Node,
    items: &[Item<'_>],
    flow: bool,
    is_map: bool,
    all_null_values: bool,
    ctx: &StringifyContext<'_>,
) -> Stringified {
    let in_flow = flow || ctx.in_flow;
    let indent_step = ctx.indent_step();
    let mut item_indent = if is_map {
        ctx.indent.clone()
    } else {
        format!("{}  ", ctx.indent)
    };
    if in_flow {
        item_indent.push_str(&indent_step);
    }
    let item_ctx = StringifyContext {
        indent: item_indent.clone(),
        implicit_key: false,
        in_flow,
        all_null_values,
        column: ctx.indent.len() as isize,
        ..ctx.clone()
    };

    // `(is_comment, text)` for each output line
    let mut lines: Vec<(bool, String)> = Vec::new();
    let mut chomp_keep = false;
    let mut has_item_with_newline = false;
    for (i, item) in items.iter().enumerate() {
        let mut comment = item.comment();
        if !chomp_keep && item.space_before() {
            lines.push((true, String::new()));
        }
        if let Some(cb) = item.comment_before() {
            for line in cb.split('\n') {
                lines.push((true, format!("#{line}")));
            }
        }
        let on_own_line =
            item.space_before() || item.comment_before().is_some() || comment.is_some();
        if in_flow && on_own_line {
            has_item_with_newline = true;
        }
        let out = item.stringify(&item_ctx);
        if out.comment_consumed {
            comment = None;
        }
        chomp_keep = out.chomp_keep;
        let mut s = out.text;
        if in_flow && s.contains('\n') {
            has_item_with_newline = true;
        }
        if in_flow && i + 1 < items.len() {
            s.push(',');
        }
        s = add_comment(&s, &item_indent, comment);
        if chomp_keep && (comment.is_some() || in_flow) {
            chomp_keep = false;
        }
        lines.push((false, s));
    }

    let (open, close) = if is_map { ('{', '}') } else { ('[', ']') };
    let mut text = if lines.is_empty() {
        format!("{open}{close}")
    } else if in_flow {
        let width: usize = lines.iter().map(|(_, s)| s.len() + 2).sum::<usize>() + 2;
        if has_item_with_newline || width > MAX_FLOW_LINE {
            let mut out = open.to_string();
            for (_, s) in &lines {
                if s.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&format!("\n{indent_step}{}{s}", ctx.indent));
                }
            }
            out.push_str(&format!("\n{}{close}", ctx.indent));
            out
        } else {
            let inner: Vec<&str> = lines.iter().map(|(_, s)| s.as_str()).collect();
            format!("{open} {} {close}", inner.join(" "))
        }
    } else {
        let block_line = |(is_comment, s): &(bool, String)| -> String {
            if *is_comment || is_map {
                s.clone()
            } else if s.is_empty() {
                "-".to_string()
            } else {
                format!("- {s}")
            }
        };
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            let s = block_line(line);
            if i == 0 {
                out.push_str(&s);
            } else if s.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("\n{}{s}", ctx.indent));
            }
        }
        out
    };

    let mut comment_consumed = false;
    if let Some(c) = &node.comment {
        if !in_flow && !lines.is_empty() {
            text.push('\n');
            text.push_str(&comment_lines(c, &ctx.indent));
            comment_consumed = true;
            chomp_keep = false;
        }
    }
    Stringified {
        text,
        comment_consumed,
        chomp_keep: chomp_keep && !in_flow,
    }
}

fn stringify_scalar(
    scalar: &Scalar,
    comment: Option<&str>,
    ctx: &StringifyContext<'_>,
) -> Stringified {
    if let Some(source) = reusable_source(scalar, ctx) {
        return Stringified::new(source);
    }
    match &scalar.value {
        ScalarValue::Null => Stringified::new(ctx.options.null_str.clone()),
        ScalarValue::Bool(b) => Stringified::new(b.to_string()),
        ScalarValue::Number(n) => Stringified::new(n.to_string()),
        ScalarValue::String(s) => stringify_string(s, scalar.style, comment, ctx),
    }
}

/// The plain source text of a scalar, if it still reads back as its value.
/// An empty source is an empty value, kept only outside keys.
fn reusable_source<'s>(scalar: &'s Scalar, ctx: &StringifyContext<'_>) -> Option<&'s str> {
    let source = scalar.source.as_deref()?;
    if source.is_empty() {
        return (scalar.value == ScalarValue::Null && !ctx.implicit_key).then_some(source);
    }
    if resolve_plain_scalar(source) != scalar.value {
        return None;
    }
    if let ScalarValue::String(s) = &scalar.value {
        if !plain_ok(s, ctx) {
            return None;
        }
    }
    Some(source)
}

fn stringify_string(
    value: &str,
    style: Option<ScalarStyle>,
    comment: Option<&str>,
    ctx: &StringifyContext<'_>,
) -> Stringified {
    let block_ok = !ctx.in_flow
        && !ctx.implicit_key
        && !value.is_empty()
        && !has_control_chars(value, true);
    match style {
        Some(ScalarStyle::BlockLiteral) if block_ok => {
            if let Some(out) = block_string(value, false, comment, ctx) {
                return out;
            }
        }
        Some(ScalarStyle::BlockFolded) if block_ok => {
            let folded = !value.split('\n').any(|line| line.starts_with([' ', '\t']));
            if let Some(out) = block_string(value, folded, comment, ctx) {
                return out;
            }
        }
        Some(ScalarStyle::QuoteSingle)
            if !value.contains('\n') && !has_control_chars(value, false) =>
        {
            return Stringified::new(format!("'{}'", value.replace('\'', "''")));
        }
        Some(ScalarStyle::QuoteDouble) => return Stringified::new(double_quoted(value)),
        _ => {}
    }
    if plain_ok(value, ctx) {
        return Stringified::new(value);
    }
    if style.is_none() && block_ok && value.contains('\n') {
        if let Some(out) = block_string(value, false, comment, ctx) {
            return out;
        }
    }
    Stringified::new(double_quoted(value))
}

fn has_control_chars(value: &str, allow_newline: bool) -> bool {
    value.chars().any(|ch| match ch {
        '\n' => !allow_newline,
        '\t' => false,
        '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{feff}' => true,
        c => c.is_control(),
    })
}

/// A literal (`|`) or folded (`>`) block scalar, or `None` if the
/// indentation indicator it needs cannot be expressed.
fn block_string(
    value: &str,
    folded: bool,
    comment: Option<&str>,
    ctx: &StringifyContext<'_>,
) -> Option<Stringified> {
    let chomp = if !value.ends_with('\n') {
        "-"
    } else if value == "\n" || value.ends_with("\n\n") {
        "+"
    } else {
        ""
    };
    let body = value.strip_suffix('\n').unwrap_or(value);
    let needs_indicator = body
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));
    let indicator = if needs_indicator {
        let width = ctx.indent.len() as isize - ctx.column;
        if !(1..=9).contains(&width) {
            return None;
        }
        width.to_string()
    } else {
        String::new()
    };

    let mut header = format!("{}{indicator}{chomp}", if folded { '>' } else { '|' });
    let comment_consumed = comment.is_some();
    if let Some(c) = comment {
        header.push_str(" #");
        header.push_str(&c.replace('\n', " "));
    }
    let body = if folded { fold_breaks(body) } else { body.to_string() };
    let lines: Vec<String> = body
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{line}", ctx.indent)
            }
        })
        .collect();
    Some(Stringified {
        text: format!("{header}\n{}", lines.join("\n")),
        comment_consumed,
        chomp_keep: chomp == "+",
    })
}

/// Inverse of folding for lines that are not more indented. A run of n
/// line breaks between two lines is written as n + 1, since a single break
/// reads back as a space. Leading and trailing breaks are kept as they are.
fn fold_breaks(body: &str) -> String {
    let content = body.trim_start_matches('\n');
    let inner = content.trim_end_matches('\n');
    let mut out = "\n".repeat(body.len() - content.len());
    let mut run = 0;
    for ch in inner.chars() {
        if ch == '\n' {
            run += 1;
            continue;
        }
        if run > 0 {
            out.push_str(&"\n".repeat(run + 1));
            run = 0;
        }
        out.push(ch);
    }
    out.push_str(&"\n".repeat(content.len() - inner.len()));
    out
}

/// Whether `s` can be written as a plain scalar and read back as the same
/// string.
fn plain_ok(s: &str, ctx: &StringifyContext<'_>) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if s != s.trim_matches([' ', '\t']) || has_control_chars(s, false) || s.contains('\t') {
        return false;
    }
    if s.starts_with("---") || s.starts_with("...") {
        return false;
    }
    let second_blank = s[first.len_utf8()..].chars().next().map_or(true, |c| c == ' ');
    match first {
        '-' | '?' | ':' if second_blank => return false,
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@'
        | '`' => return false,
        _ => {}
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }
    if ctx.in_flow && s.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    if ctx.in_flow && s.contains(':') {
        return false;
    }
    resolve_plain_scalar(s) == ScalarValue::String(s.to_string())
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            '\u{feff}' => out.push_str("\\uFEFF"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Alias;

    fn render(node: &Node) -> String {
        let options = Options::default();
        node.stringify(&StringifyContext::new(&options, &[])).text
    }

    fn map(pairs: Vec<Pair>) -> Node {
        let mut map = Map::new();
        for pair in pairs {
            map.push(pair);
        }
        Node::from(map)
    }

    #[test]
    fn test_block_map_and_seq() {
        let node = map(vec![
            Pair::new("a", 1),
            Pair::new("list", vec![Node::from("x"), Node::from(true)]),
        ]);
        assert_eq!(render(&node), "a: 1\nlist:\n  - x\n  - true");
    }

    #[test]
    fn test_collection_key_is_explicit() {
        let key = map(vec![Pair::new("k", "v")]);
        let node = map(vec![Pair::new(key, "value")]);
        assert_eq!(render(&node), "? k: v\n: value");
    }

    #[test]
    fn test_all_null_values() {
        let node = map(vec![Pair::key_only(Some(Node::from("a"))), Pair::new("b", ())]);
        assert_eq!(render(&node), "? a\n? b");

        let mut flow = Map::new();
        flow.flow = true;
        flow.push(Pair::key_only(None));
        flow.push(Pair::key_only(Some(Node::from("c"))));
        assert_eq!(render(&Node::from(flow)), "{ ?, c }");
    }

    #[test]
    fn test_folded_block_doubles_inner_breaks() {
        assert_eq!(fold_breaks("one\n\ntwo"), "one\n\n\ntwo");
        assert_eq!(fold_breaks("one\ntwo"), "one\n\ntwo");
        assert_eq!(fold_breaks("\nlead\n"), "\nlead\n");

        let mut scalar = Scalar::new("one\n\ntwo\n");
        scalar.style = Some(ScalarStyle::BlockFolded);
        let node = map(vec![Pair::new("a", scalar)]);
        assert_eq!(render(&node), "a: >\n  one\n\n\n  two");
    }

    #[test]
    fn test_flow_collections() {
        let mut inner = Map::new();
        inner.flow = true;
        inner.push(Pair::new("x", 1));
        inner.push(Pair::new("y", "two words"));
        assert_eq!(render(&Node::from(inner)), "{ x: 1, y: two words }");

        let mut seq = Seq::new();
        seq.flow = true;
        for i in 0..20 {
            seq.push(format!("item{i}"));
        }
        let text = render(&Node::from(seq));
        assert!(text.starts_with("[\n  item0,\n"), "{text}");
        assert!(text.ends_with("\n]"));
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(render(&Node::from("plain text")), "plain text");
        assert_eq!(render(&Node::from("123")), "\"123\"");
        assert_eq!(render(&Node::from("a: b")), "\"a: b\"");
        assert_eq!(render(&Node::from("- x")), "\"- x\"");
        assert_eq!(render(&Node::from("")), "\"\"");
        assert_eq!(render(&Node::from("tab\there")), "\"tab\\there\"");
        assert_eq!(render(&Node::from("-x")), "-x");
    }

    #[test]
    fn test_multiline_string_uses_literal_block() {
        let node = map(vec![Pair::new("text", "one\ntwo\n")]);
        assert_eq!(render(&node), "text: |\n  one\n  two");
        let node = map(vec![Pair::new("text", "one\ntwo")]);
        assert_eq!(render(&node), "text: |-\n  one\n  two");
    }

    #[test]
    fn test_block_scalar_keep() {
        let mut scalar = Scalar::new("a\n\n");
        scalar.style = Some(ScalarStyle::BlockLiteral);
        let node = map(vec![Pair::new("k", scalar)]);
        assert_eq!(render(&node), "k: |+\n  a\n");
    }

    #[test]
    fn test_block_scalar_indentation_indicator() {
        let node = map(vec![Pair::new("k", "  lead\nrest\n")]);
        assert_eq!(render(&node), "k: |2\n    lead\n  rest");
    }

    #[test]
    fn test_source_text_is_reused() {
        let mut scalar = Scalar::new(31);
        scalar.source = Some("0x1F".to_string());
        assert_eq!(render(&Node::from(scalar)), "0x1F");

        let mut stale = Scalar::new(32);
        stale.source = Some("0x1F".to_string());
        assert_eq!(render(&Node::from(stale)), "32");
    }

    #[test]
    fn test_comments() {
        let mut pair = Pair::new("a", Node::from(1).with_comment(" one"));
        pair.set_comment_before(Some(" lead".to_string()));
        let mut b = Pair::new("b", 2);
        b.space_before = true;
        let node = map(vec![pair, b]).with_comment(" end");
        assert_eq!(render(&node), "# lead\na: 1 # one\n\nb: 2\n# end");
    }

    #[test]
    fn test_props() {
        let node = map(vec![
            Pair::new("a", Node::from(1).with_anchor("x")),
            Pair::new("b", Alias::new("x")),
        ]);
        assert_eq!(render(&node), "a: &x 1\nb: *x");

        let mut tagged = Node::from("v");
        tagged.tag = Some("tag:example.com,2000:thing".to_string());
        assert_eq!(render(&tagged), "!<tag:example.com,2000:thing> v");
        let prefixes = [TagPrefix::new("!e!", "tag:example.com,2000:")];
        let options = Options::default();
        let ctx = StringifyContext::new(&options, &prefixes);
        assert_eq!(tagged.stringify(&ctx).text, "!e!thing v");

        let mut default_tag = Node::from("v");
        default_tag.tag = Some("tag:yaml.org,2002:str".to_string());
        assert_eq!(render(&default_tag), "v");
    }

    #[test]
    fn test_empty_collections() {
        let node = map(vec![Pair::new("m", Map::new()), Pair::new("s", Seq::new())]);
        assert_eq!(render(&node), "m: {}\ns: []");
    }
}

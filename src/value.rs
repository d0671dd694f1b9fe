//! The logical document model.
//!
//! Resolving a CST yields a tree of [`Node`]s. Each node carries a [`Value`]
//! (a scalar, map, sequence or alias) together with the metadata that makes
//! round-trip editing possible: tag, anchor, the comment on the same line,
//! the comment lines before it, and whether a blank line preceded it.
//!
//! ## Core Types
//!
//! - [`Node`]: a value plus its tag, anchor and comments
//! - [`Scalar`]: a [`ScalarValue`] with its source style and text
//! - [`Map`]: ordered [`MapItem`]s, each a [`Pair`] or a [`Merge`]
//! - [`Seq`]: ordered nodes
//! - [`Alias`]: a reference to an anchored node
//! - [`Number`]: integers, floats and the special values `.inf`, `-.inf`, `.nan`
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::{Map, Node, Pair};
//!
//! let mut map = Map::new();
//! map.push(Pair::new("name", "demo"));
//! map.push(Pair::new("replicas", 3));
//!
//! let node = Node::from(map);
//! assert_eq!(node.as_map().map(Map::len), Some(2));
//! assert_eq!(node.as_map().and_then(|m| m.get("replicas")).and_then(Node::as_i64), Some(3));
//! ```

use crate::anchors::AnchorId;
use crate::cst::Range;
use std::fmt;

/// A numeric value: an integer, a float, or one of the special values.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::Number;
///
/// let integer = Number::Integer(42);
/// let float = Number::Float(3.5);
/// let infinity = Number::Infinity;
///
/// assert!(integer.is_integer());
/// assert_eq!(integer.as_i64(), Some(42));
/// assert_eq!(float.as_f64(), 3.5);
/// assert!(infinity.is_special());
/// assert_eq!(infinity.to_string(), ".inf");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns `true` for `.inf`, `-.inf` and `.nan`.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Converts this number to an `i64` if it is integral and in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::Number;
    ///
    /// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.5).as_i64(), None);
    /// assert_eq!(Number::NaN.as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            // Debug keeps a fractional part or exponent, so the text reads
            // back as a float
            Number::Float(fl) => write!(f, "{:?}", fl),
            Number::Infinity => f.write_str(".inf"),
            Number::NegativeInfinity => f.write_str("-.inf"),
            Number::NaN => f.write_str(".nan"),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

/// The resolved value of a scalar.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ScalarValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl fmt::Display for ScalarValue {
    /// The plain-text form used for string keys: null is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => Ok(()),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::String(s) => f.write_str(s),
        }
    }
}

/// The source style of a scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    QuoteDouble,
    QuoteSingle,
    BlockLiteral,
    BlockFolded,
}

/// A scalar: its value, the style it was written in, and for plain
/// scalars the exact source text.
///
/// Keeping `source` lets `~`, `0x1F` or `1.50` stringify as they were
/// written rather than in canonical form.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scalar {
    pub value: ScalarValue,
    pub style: Option<ScalarStyle>,
    pub source: Option<String>,
}

impl Scalar {
    #[must_use]
    pub fn new(value: impl Into<ScalarValue>) -> Self {
        Scalar {
            value: value.into(),
            style: None,
            source: None,
        }
    }
}

/// An alias: a reference to the node carrying anchor `source`.
///
/// `target` identifies the anchor definition within the owning document's
/// [`Anchors`](crate::Anchors); it is `None` for an alias whose anchor was
/// never defined, and for aliases built by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub source: String,
    pub target: Option<AnchorId>,
}

impl Alias {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Alias {
            source: source.into(),
            target: None,
        }
    }
}

/// A key-value entry of a mapping.
///
/// The comment lines before a pair are stored on its key.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Pair {
    pub key: Option<Node>,
    pub value: Option<Node>,
    /// A comment on the line of the `:` indicator.
    pub comment: Option<String>,
    /// A blank line preceded the pair.
    pub space_before: bool,
}

impl Pair {
    #[must_use]
    pub fn new(key: impl Into<Node>, value: impl Into<Node>) -> Self {
        Pair {
            key: Some(key.into()),
            value: Some(value.into()),
            comment: None,
            space_before: false,
        }
    }

    /// A pair with no value, as in `? key` or the `a` of `{ a, b: 1 }`.
    #[must_use]
    pub fn key_only(key: Option<Node>) -> Self {
        Pair {
            key,
            value: None,
            comment: None,
            space_before: false,
        }
    }

    #[must_use]
    pub fn comment_before(&self) -> Option<&str> {
        self.key.as_ref().and_then(|k| k.comment_before.as_deref())
    }

    /// Sets the comment lines before the pair, creating a null key if the
    /// pair has none.
    pub fn set_comment_before(&mut self, comment: Option<String>) {
        self.key.get_or_insert_with(Node::null).comment_before = comment;
    }

    /// The key in plain string form: a scalar's text, an empty string for
    /// null, or a compact flow rendering for collection keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::{Pair, Node};
    ///
    /// assert_eq!(Pair::new(42, "x").string_key(), "42");
    /// assert_eq!(Pair::key_only(None).string_key(), "");
    /// ```
    #[must_use]
    pub fn string_key(&self) -> String {
        match &self.key {
            None => String::new(),
            Some(key) => key.to_plain_string(),
        }
    }
}

/// A `<<` merge entry. Its value is an alias to a mapping, or a sequence
/// of such aliases.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Merge {
    pub pair: Pair,
}

impl Merge {
    /// The aliases whose mappings are merged, in order.
    #[must_use]
    pub fn sources(&self) -> Vec<&Alias> {
        match self.pair.value.as_ref().map(|v| &v.value) {
            Some(Value::Alias(alias)) => vec![alias],
            Some(Value::Seq(seq)) => seq.items.iter().filter_map(Node::as_alias).collect(),
            _ => Vec::new(),
        }
    }
}

/// An entry of a [`Map`].
#[derive(Clone, Debug, PartialEq)]
pub enum MapItem {
    Pair(Pair),
    Merge(Merge),
}

impl MapItem {
    #[must_use]
    pub fn pair(&self) -> &Pair {
        match self {
            MapItem::Pair(pair) => pair,
            MapItem::Merge(merge) => &merge.pair,
        }
    }

    pub fn pair_mut(&mut self) -> &mut Pair {
        match self {
            MapItem::Pair(pair) => pair,
            MapItem::Merge(merge) => &mut merge.pair,
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&Node> {
        self.pair().key.as_ref()
    }

    #[must_use]
    pub fn value(&self) -> Option<&Node> {
        self.pair().value.as_ref()
    }

    #[must_use]
    pub const fn is_merge(&self) -> bool {
        matches!(self, MapItem::Merge(_))
    }
}

impl From<Pair> for MapItem {
    fn from(pair: Pair) -> Self {
        MapItem::Pair(pair)
    }
}

/// An ordered mapping. Items keep source order, duplicates included.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Map {
    pub items: Vec<MapItem>,
    /// Written as `{ ... }` rather than in block form.
    pub flow: bool,
}

impl Map {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: impl Into<MapItem>) {
        self.items.push(item.into());
    }

    /// The value of the first pair whose [`Pair::string_key`] equals `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.items
            .iter()
            .filter(|item| !item.is_merge())
            .find(|item| item.pair().string_key() == key)
            .and_then(MapItem::value)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.items.iter().map(MapItem::pair)
    }
}

/// An ordered sequence.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Seq {
    pub items: Vec<Node>,
    /// Written as `[ ... ]` rather than in block form.
    pub flow: bool,
}

impl Seq {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.items.push(node.into());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Map(Map),
    Seq(Seq),
    Alias(Alias),
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(Scalar::default())
    }
}

/// A logical node.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Node {
    pub value: Value,
    /// The resolved tag, e.g. `tag:yaml.org,2002:str`, when one was given
    /// explicitly.
    pub tag: Option<String>,
    pub anchor: Option<String>,
    /// Comment text on the node's last line, without the `#`.
    pub comment: Option<String>,
    /// Comment lines before the node, newline-joined, without the `#`.
    pub comment_before: Option<String>,
    /// A blank line preceded the node.
    pub space_before: bool,
    /// Source range, for nodes read from text.
    pub range: Option<Range>,
}

impl Node {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Node {
            value,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn null() -> Self {
        Node::default()
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(
            self.value,
            Value::Scalar(Scalar {
                value: ScalarValue::Null,
                ..
            })
        )
    }

    /// Returns `true` for maps and sequences.
    #[inline]
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.value, Value::Map(_) | Value::Seq(_))
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match &self.value {
            Value::Scalar(scalar) => Some(&scalar.value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.as_scalar()? {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            ScalarValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_scalar()? {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match &self.value {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match &mut self.value {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_seq(&self) -> Option<&Seq> {
        match &self.value {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Seq> {
        match &mut self.value {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_alias(&self) -> Option<&Alias> {
        match &self.value {
            Value::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    /// Attaches a same-line comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attaches comment lines to print before the node.
    #[must_use]
    pub fn with_comment_before(mut self, comment: impl Into<String>) -> Self {
        self.comment_before = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Scalars as their text; collections in a compact JSON-like form.
    pub(crate) fn to_plain_string(&self) -> String {
        match &self.value {
            Value::Scalar(scalar) => scalar.value.to_string(),
            Value::Alias(alias) => format!("*{}", alias.source),
            Value::Map(map) => {
                let entries: Vec<String> = map
                    .pairs()
                    .map(|pair| {
                        let value = pair
                            .value
                            .as_ref()
                            .map_or("null".to_string(), Node::to_json_like);
                        format!("{}:{}", quote_json(&pair.string_key()), value)
                    })
                    .collect();
                format!("{{{}}}", entries.join(","))
            }
            Value::Seq(seq) => {
                let entries: Vec<String> = seq.items.iter().map(Node::to_json_like).collect();
                format!("[{}]", entries.join(","))
            }
        }
    }

    fn to_json_like(&self) -> String {
        match &self.value {
            Value::Scalar(Scalar {
                value: ScalarValue::Null,
                ..
            }) => "null".to_string(),
            Value::Scalar(Scalar {
                value: ScalarValue::String(s),
                ..
            }) => quote_json(s),
            _ => self.to_plain_string(),
        }
    }
}

fn quote_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Number(Number::from(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(Number::from(value))
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::Number(Number::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(Number::from(value))
    }
}

impl From<Number> for ScalarValue {
    fn from(value: Number) -> Self {
        ScalarValue::Number(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<()> for ScalarValue {
    fn from(_: ()) -> Self {
        ScalarValue::Null
    }
}

macro_rules! node_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::new(Value::Scalar(Scalar::new(value)))
                }
            }
        )*
    };
}

node_from_scalar!(bool, i32, i64, u32, f64, Number, String, &str, (), ScalarValue);

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::new(Value::Scalar(value))
    }
}

impl From<Map> for Node {
    fn from(value: Map) -> Self {
        Node::new(Value::Map(value))
    }
}

impl From<Seq> for Node {
    fn from(value: Seq) -> Self {
        Node::new(Value::Seq(value))
    }
}

impl From<Alias> for Node {
    fn from(value: Alias) -> Self {
        Node::new(Value::Alias(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::from(Seq { items, flow: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Integer(-3).to_string(), "-3");
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::NegativeInfinity.to_string(), "-.inf");
        assert_eq!(Number::from(f64::NAN), Number::NaN);
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Node::from(true).as_bool(), Some(true));
        assert_eq!(Node::from(42).as_i64(), Some(42));
        assert_eq!(Node::from("x").as_str(), Some("x"));
        assert!(Node::from(()).is_null());
        assert!(Node::null().is_null());
    }

    #[test]
    fn test_comment_before_lives_on_key() {
        let mut pair = Pair::key_only(None);
        assert_eq!(pair.comment_before(), None);
        pair.set_comment_before(Some("note".to_string()));
        assert_eq!(pair.comment_before(), Some("note"));
        assert!(pair.key.as_ref().is_some_and(Node::is_null));
    }

    #[test]
    fn test_string_key_of_collection() {
        let mut key = Map::new();
        key.push(Pair::new("a", 1));
        let pair = Pair::new(key, "v");
        assert_eq!(pair.string_key(), "{\"a\":1}");
        let seq = Node::from(vec![Node::from(1), Node::from("b")]);
        assert_eq!(Pair::new(seq, 0).string_key(), "[1,\"b\"]");
    }

    #[test]
    fn test_merge_sources() {
        let merge = Merge {
            pair: Pair::new("<<", vec![Node::from(Alias::new("a")), Node::from(Alias::new("b"))]),
        };
        let names: Vec<&str> = merge.sources().iter().map(|a| a.source.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_map_get_skips_merges() {
        let mut map = Map::new();
        map.push(MapItem::Merge(Merge {
            pair: Pair::new("<<", Alias::new("base")),
        }));
        map.push(Pair::new("x", 1));
        assert_eq!(map.get("x").and_then(Node::as_i64), Some(1));
        assert!(map.get("<<").is_none());
    }
}

/// Builds a logical [`Node`](crate::Node) from JSON-like syntax.
///
/// Maps and sequences are built in block style. Anything that is not
/// `null`, `true`, `false`, a `[...]` list or a `{...}` map is passed to
/// `Node::from`, so negative numbers and other expressions need
/// parentheses: `yaml!([(-1), (2 * 3)])`.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::yaml;
///
/// let node = yaml!({
///     "name": "demo",
///     "replicas": 3,
///     "ports": [80, 443],
///     "debug": null
/// });
/// let map = node.as_map().unwrap();
/// assert_eq!(map.len(), 4);
/// assert_eq!(map.get("replicas").and_then(|n| n.as_i64()), Some(3));
/// assert!(map.get("debug").is_some_and(|n| n.is_null()));
/// ```
#[macro_export]
macro_rules! yaml {
    (null) => {
        $crate::Node::null()
    };

    (true) => {
        $crate::Node::from(true)
    };

    (false) => {
        $crate::Node::from(false)
    };

    ([]) => {
        $crate::Node::from($crate::Seq::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        let mut seq = $crate::Seq::new();
        $(
            seq.push($crate::yaml!($elem));
        )*
        $crate::Node::from(seq)
    }};

    ({}) => {
        $crate::Node::from($crate::Map::new())
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        let mut map = $crate::Map::new();
        $(
            map.push($crate::Pair::new($crate::yaml!($key), $crate::yaml!($value)));
        )*
        $crate::Node::from(map)
    }};

    ($other:expr) => {
        $crate::Node::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Node, Number, ScalarValue, Value};

    #[test]
    fn test_yaml_macro_primitives() {
        assert!(yaml!(null).is_null());
        assert_eq!(yaml!(true).as_bool(), Some(true));
        assert_eq!(yaml!(42).as_scalar(), Some(&ScalarValue::Number(Number::Integer(42))));
        assert_eq!(yaml!(3.5).as_scalar(), Some(&ScalarValue::Number(Number::Float(3.5))));
        assert_eq!(yaml!("hello").as_str(), Some("hello"));
        assert_eq!(yaml!((-7)).as_i64(), Some(-7));
    }

    #[test]
    fn test_yaml_macro_collections() {
        let seq = yaml!([1, "two", [3]]);
        let items = &seq.as_seq().unwrap().items;
        assert_eq!(items.len(), 3);
        assert!(matches!(items[2].value, Value::Seq(_)));

        let map = yaml!({ "a": { "b": null }, 1: "numeric key" });
        let map = map.as_map().unwrap();
        assert!(!map.flow);
        assert_eq!(map.items[1].key().and_then(Node::as_i64), Some(1));
        assert_eq!(map.get("1").and_then(Node::as_str), Some("numeric key"));
    }
}

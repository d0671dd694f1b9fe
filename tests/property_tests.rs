//! Property-based tests for the parse and stringify guarantees
//!
//! Generated maps are stringified, parsed back and compared as plain data,
//! and generated keys check that resolution keeps every pair in order.

use lossless_yaml::{parse_document, stringify, Map, Node, Options, Pair};
use proptest::prelude::*;

fn map_of(pairs: Vec<(String, Node)>) -> Node {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.push(Pair::new(key, value));
    }
    Node::from(map)
}

/// Stringifies `node` under the key `v`, parses the output and returns the
/// value read back.
fn reparse(node: Node) -> Result<Node, String> {
    let text = stringify(&map_of(vec![("v".to_string(), node)]), &Options::new());
    let doc = parse_document(&text);
    if !doc.errors.is_empty() {
        return Err(format!("{text:?}: {:?}", doc.errors));
    }
    doc.get("v").cloned().ok_or_else(|| format!("{text:?}: no value"))
}

proptest! {
    #[test]
    fn prop_unique_keys_resolve_in_order(
        keys in prop::collection::btree_set("k[a-z]{0,7}", 1..20)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let src: String = keys.iter().enumerate().map(|(i, k)| format!("{k}: {i}\n")).collect();
        let doc = parse_document(&src);
        prop_assert!(doc.errors.is_empty(), "{:?}", doc.errors);
        let map = doc.contents.as_ref().and_then(Node::as_map).unwrap();
        let resolved: Vec<String> = map.pairs().map(Pair::string_key).collect();
        prop_assert_eq!(resolved, keys);
    }

    #[test]
    fn prop_string_roundtrip(s in "[ -~]{0,40}") {
        let value = reparse(Node::from(s.as_str())).map_err(TestCaseError::fail)?;
        prop_assert_eq!(value.as_str(), Some(s.as_str()));
    }

    #[test]
    fn prop_multiline_string_roundtrip(
        lines in prop::collection::vec("[a-z][a-z ]{0,10}[a-z]", 1..5),
        trailing in any::<bool>()
    ) {
        let mut s = lines.join("\n");
        if trailing {
            s.push('\n');
        }
        let value = reparse(Node::from(s.as_str())).map_err(TestCaseError::fail)?;
        prop_assert_eq!(value.as_str(), Some(s.as_str()));
    }

    #[test]
    fn prop_i64_roundtrip(n in any::<i64>()) {
        let value = reparse(Node::from(n)).map_err(TestCaseError::fail)?;
        prop_assert_eq!(value.as_i64(), Some(n));
    }

    #[test]
    fn prop_f64_roundtrip(f in -1e15f64..1e15f64) {
        let value = reparse(Node::from(f)).map_err(TestCaseError::fail)?;
        let back = serde_json::to_value(lossless_yaml::Document::new(value)).unwrap();
        prop_assert_eq!(back.as_f64(), Some(f));
    }

    #[test]
    fn prop_bool_roundtrip(b in any::<bool>()) {
        let value = reparse(Node::from(b)).map_err(TestCaseError::fail)?;
        prop_assert_eq!(value.as_bool(), Some(b));
    }
}

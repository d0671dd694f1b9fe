use lossless_yaml::{yaml, Document, Node, Number, ScalarValue, Value};

#[test]
fn test_yaml_macro_null() {
    let value = yaml!(null);
    assert_eq!(value.as_scalar(), Some(&ScalarValue::Null));
}

#[test]
fn test_yaml_macro_booleans() {
    assert_eq!(yaml!(true).as_bool(), Some(true));
    assert_eq!(yaml!(false).as_bool(), Some(false));
}

#[test]
fn test_yaml_macro_numbers() {
    assert_eq!(yaml!(42).as_scalar(), Some(&ScalarValue::Number(Number::Integer(42))));
    assert_eq!(yaml!(3.5).as_scalar(), Some(&ScalarValue::Number(Number::Float(3.5))));
    assert_eq!(yaml!((-123)).as_i64(), Some(-123));
}

#[test]
fn test_yaml_macro_strings() {
    assert_eq!(yaml!("hello").as_str(), Some("hello"));
    let owned = String::from("owned");
    assert_eq!(yaml!(owned).as_str(), Some("owned"));
}

#[test]
fn test_yaml_macro_sequences() {
    let empty = yaml!([]);
    assert!(empty.as_seq().is_some_and(|s| s.is_empty()));

    let seq = yaml!([1, "two", null, [true]]);
    let seq = seq.as_seq().unwrap();
    assert_eq!(seq.len(), 4);
    assert!(!seq.flow);
    assert!(seq.items[2].is_null());
    assert!(matches!(seq.items[3].value, Value::Seq(_)));
}

#[test]
fn test_yaml_macro_maps() {
    let empty = yaml!({});
    assert!(empty.as_map().is_some_and(|m| m.is_empty()));

    let node = yaml!({
        "name": "demo",
        "nested": { "level": 2 },
        "list": [1, 2],
    });
    let map = node.as_map().unwrap();
    let keys: Vec<String> = map.pairs().map(|p| p.string_key()).collect();
    assert_eq!(keys, vec!["name", "nested", "list"]);
    let nested = map.get("nested").and_then(Node::as_map).unwrap();
    assert_eq!(nested.get("level").and_then(Node::as_i64), Some(2));
}

#[test]
fn test_yaml_macro_stringifies() {
    let doc = Document::new(yaml!({ "a": [1, { "b": null, "d": 2 }], "c": "x y" }));
    assert_eq!(doc.to_string(), "a:\n  - 1\n  - b: null\n    d: 2\nc: x y\n");
}

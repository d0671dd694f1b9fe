//! # lossless_yaml
//!
//! A comment-preserving YAML parser. Source text is read into a concrete
//! syntax tree that keeps every byte, resolved into an editable logical tree
//! that keeps comments, blank lines, anchors and scalar styles, and written
//! back out as YAML.
//!
//! ## Key Features
//!
//! - **Lossless CST**: every node records the byte ranges it came from, so
//!   the source can be reproduced exactly
//! - **Round-trip editing**: comments and blank lines stay attached to the
//!   key or item they precede
//! - **Error accumulation**: parsing never stops at the first problem; all
//!   errors and warnings are collected on the document
//! - **Serde view**: any document serializes as plain data, with aliases
//!   and merge keys expanded
//!
//! ## Quick Start
//!
//! ```rust
//! use lossless_yaml::{parse_document, Pair};
//!
//! let src = "# service\nname: web # public name\n\nports: [80, 443]\n";
//! let mut doc = parse_document(src);
//! assert!(doc.errors.is_empty());
//!
//! let map = doc.contents.as_mut().and_then(|n| n.as_map_mut()).unwrap();
//! map.push(Pair::new("replicas", 3));
//!
//! assert_eq!(
//!     doc.to_string(),
//!     "# service\nname: web # public name\n\nports: [ 80, 443 ]\nreplicas: 3\n"
//! );
//! ```
//!
//! ### Errors Are Collected, Not Raised
//!
//! ```rust
//! use lossless_yaml::{parse_document, ErrorKind};
//!
//! let doc = parse_document("a: 1\na: 2\nb: *missing\n");
//! assert_eq!(doc.errors.len(), 2);
//! assert_eq!(doc.errors[0].kind(), ErrorKind::Reference);
//! assert_eq!(doc.errors[1].kind(), ErrorKind::Semantic);
//!
//! // the tree is still there
//! assert_eq!(doc.contents.and_then(|n| n.as_map().map(|m| m.len())), Some(3));
//! ```
//!
//! ### Working with the CST
//!
//! ```rust
//! use lossless_yaml::parse_cst;
//!
//! let src = "a: 1 # one\n---\n- x\n";
//! let stream = parse_cst(src);
//! assert_eq!(stream.documents.len(), 2);
//! // documents are rejoined with explicit end markers
//! assert_eq!(stream.to_string(), "a: 1 # one\n...\n- x\n");
//! ```
//!
//! ## Modules
//!
//! - [`cst`]: the concrete syntax tree and its parser
//! - [`document`]: resolved documents
//! - [`value`]: the logical node types
//! - [`stringify`]: writing logical nodes as YAML
//! - [`ser`]: the `serde` data view
//! - [`anchors`]: anchor definitions and alias lookup

pub mod anchors;
pub mod cst;
pub mod document;
pub mod error;
pub mod macros;
pub mod options;
mod resolve;
pub mod ser;
pub mod stringify;
pub mod value;

pub use anchors::{AnchorId, Anchors};
pub use document::{Document, TagPrefix};
pub use error::{ErrorKind, Warning, YamlError};
pub use options::{Options, Version};
pub use stringify::{Stringified, StringifyContext};
pub use value::{
    Alias, Map, MapItem, Merge, Node, Number, Pair, Scalar, ScalarStyle, ScalarValue, Seq, Value,
};

/// Parses `src` into a concrete syntax tree.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::{cst::NodeType, parse_cst};
///
/// let stream = parse_cst("key: value\n");
/// assert_eq!(stream.documents[0].contents[0].node_type(), NodeType::Map);
/// ```
#[must_use]
pub fn parse_cst(src: &str) -> cst::Stream {
    cst::parse(src)
}

/// Parses and resolves every document in `src` with default options.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::parse_all_documents;
///
/// let docs = parse_all_documents("a: 1\n---\nb: 2\n");
/// assert_eq!(docs.len(), 2);
/// assert_eq!(docs[1].get("b").and_then(|n| n.as_i64()), Some(2));
/// ```
#[must_use]
pub fn parse_all_documents(src: &str) -> Vec<Document> {
    parse_all_documents_with(src, Options::default())
}

/// Parses and resolves every document in `src`.
#[must_use]
pub fn parse_all_documents_with(src: &str, options: Options) -> Vec<Document> {
    let stream = cst::parse(src);
    let mut docs: Vec<Document> = Vec::with_capacity(stream.documents.len());
    for cst_doc in &stream.documents {
        let doc = Document::parse_after(&stream.src, cst_doc, options.clone(), docs.last());
        docs.push(doc);
    }
    docs
}

/// Parses and resolves the first document in `src` with default options.
///
/// If the source holds more than one document, the first error of the
/// result says so; only the first document is resolved.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::parse_document;
///
/// let doc = parse_document("- a\n- b\n");
/// assert!(doc.errors.is_empty());
/// assert_eq!(doc.contents.as_ref().and_then(|n| n.as_seq()).map(|s| s.len()), Some(2));
///
/// let doc = parse_document("a\n---\nb\n");
/// assert!(doc.errors[0].message().starts_with("Source contains multiple documents"));
/// ```
#[must_use]
pub fn parse_document(src: &str) -> Document {
    parse_document_with(src, Options::default())
}

/// Parses and resolves the first document in `src`.
#[must_use]
pub fn parse_document_with(src: &str, options: Options) -> Document {
    let stream = cst::parse(src);
    let Some(first) = stream.documents.first() else {
        return Document {
            options,
            ..Default::default()
        };
    };
    let mut doc = Document::parse(&stream.src, first, options);
    if let Some(second) = stream.documents.get(1) {
        let message = "Source contains multiple documents; please use parse_all_documents()";
        doc.errors
            .insert(0, YamlError::semantic(message).with_range(second.range));
    }
    doc
}

/// Writes `node` as a YAML document.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::{stringify, yaml, Options};
///
/// let node = yaml!({ "a": 1, "b": [true, null] });
/// assert_eq!(stringify(&node, &Options::new()), "a: 1\nb:\n  - true\n  - null\n");
/// ```
#[must_use]
pub fn stringify(node: &Node, options: &Options) -> String {
    Document {
        contents: Some(node.clone()),
        options: options.clone(),
        ..Default::default()
    }
    .to_string()
}

//! The concrete syntax tree.
//!
//! Every node records the byte ranges it was read from, so the tree keeps
//! every character of the source: comments, blank lines and indentation
//! included. Node ranges refer to the normalized source held by the
//! [`Stream`], in which all line endings are `\n`.
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::cst::{self, NodeType};
//!
//! let stream = cst::parse("# settings\nname: demo # inline\n");
//! let doc = &stream.documents[0];
//! assert_eq!(doc.contents[0].node_type(), NodeType::Comment);
//! assert_eq!(doc.contents[1].node_type(), NodeType::Map);
//! assert_eq!(stream.to_string(), "---\n# settings\nname: demo # inline\n");
//! ```

mod collection;
mod document;
mod node;
mod parser;
mod range;
mod scalar;
mod source;
mod stream;

pub use document::Document;
pub use node::{BlockHeader, Chomp, Context, FlowItem, Indicator, Node, NodeKind, NodeType};
pub use parser::Parser;
pub use range::Range;
pub use scalar::StrValue;
pub use stream::{parse, Stream};

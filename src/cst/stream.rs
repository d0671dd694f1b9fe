//! The multi-document stream driver.

use super::document::Document;
use super::parser::Parser;

/// All documents of a source text, parsed from its normalized form.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::cst;
///
/// let stream = cst::parse("a: 1\r\n---\r\nb: 2\r\n");
/// assert_eq!(stream.documents.len(), 2);
/// assert_eq!(stream.src, "a: 1\n---\nb: 2\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// The source with every `\r\n` and lone `\r` replaced by `\n`.
    pub src: String,
    pub documents: Vec<Document>,
    /// Normalized offsets at which a `\r` was dropped, ascending.
    cr: Vec<usize>,
}

/// Parses every document in `src`.
#[must_use]
pub fn parse(src: &str) -> Stream {
    let (normalized, cr) = normalize_line_endings(src);
    let parser = Parser::new(&normalized);
    let mut documents = Vec::new();
    let mut offset = 0;
    loop {
        let (doc, end) = Document::parse(&parser, offset);
        documents.push(doc);
        if end >= normalized.len() {
            break;
        }
        // a document always consumes input; guard against a stuck parse
        offset = if end > offset { end } else { offset + 1 };
    }
    tracing::debug!(documents = documents.len(), crlf = cr.len(), "parsed stream");
    Stream {
        src: normalized,
        documents,
        cr,
    }
}

fn normalize_line_endings(src: &str) -> (String, Vec<usize>) {
    if !src.contains('\r') {
        return (src.to_string(), Vec::new());
    }
    let mut out = String::with_capacity(src.len());
    let mut cr = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
                cr.push(out.len());
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    (out, cr)
}

impl Stream {
    /// Sets `orig_start`/`orig_end` on every range to its offset in the
    /// original, un-normalized source. Returns `false` if the source had no
    /// `\r\n` line endings, in which case nothing is changed.
    pub fn set_orig_ranges(&mut self) -> bool {
        if self.cr.is_empty() {
            return false;
        }
        let cr = std::mem::take(&mut self.cr);
        let mut offset = 0;
        for doc in &mut self.documents {
            offset = doc.set_orig_ranges(&cr, offset);
        }
        true
    }

    /// The source text of all documents, separated by `...` lines.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.documents
            .iter()
            .map(|doc| doc.to_string(&self.src))
            .collect::<Vec<_>>()
            .join("...\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::NodeType;

    #[test]
    fn test_normalize_records_removed_bytes() {
        let (src, cr) = normalize_line_endings("a\r\nb\rc\r\n");
        assert_eq!(src, "a\nb\nc\n");
        assert_eq!(cr, vec![1, 5]);
    }

    #[test]
    fn test_orig_ranges() {
        let mut stream = parse("a: 1\r\nb: 2\r\n");
        assert!(stream.set_orig_ranges());
        let map = &stream.documents[0].contents[0];
        assert_eq!(map.node_type(), NodeType::Map);
        let crate::cst::NodeKind::Map(items) = &map.kind else {
            panic!("expected map");
        };
        let key_b = &items[2];
        assert_eq!(key_b.range.start, 5);
        assert_eq!(key_b.range.orig_start, Some(6));
        assert!(!stream.set_orig_ranges());
    }

    #[test]
    fn test_multiple_documents() {
        let stream = parse("a\n---\nb\n...\nc\n");
        assert_eq!(stream.documents.len(), 3);
    }
}

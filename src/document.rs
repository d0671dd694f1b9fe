//! Logical documents.
//!
//! A [`Document`] is one resolved document of a stream: its directives, its
//! comments, the logical tree of its contents, its anchors, and every error
//! and warning found while resolving it.
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::parse_document;
//!
//! let doc = parse_document("%YAML 1.1\n---\n# settings\nport: 8080\n");
//! assert!(doc.errors.is_empty());
//! assert_eq!(doc.get("port").and_then(|n| n.as_i64()), Some(8080));
//! assert_eq!(doc.to_string(), "%YAML 1.1\n---\n# settings\nport: 8080\n");
//! ```

use crate::anchors::Anchors;
use crate::cst::{self, NodeKind, Range};
use crate::error::{Warning, YamlError};
use crate::options::{Options, Version};
use crate::resolve::Resolver;
use crate::stringify::{add_comment, comment_lines, StringifyContext};
use crate::value::{Node, Value};
use std::fmt;

/// A `%TAG` directive: `handle` (`!`, `!!` or `!name!`) expands to `prefix`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPrefix {
    pub handle: String,
    pub prefix: String,
}

impl TagPrefix {
    #[must_use]
    pub fn new(handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        TagPrefix {
            handle: handle.into(),
            prefix: prefix.into(),
        }
    }
}

/// One resolved document.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    pub contents: Option<Node>,
    /// Comment lines before the contents, or in the directives section.
    pub comment_before: Option<String>,
    /// Comment lines after the contents.
    pub comment: Option<String>,
    /// The source had a `---` line.
    pub directives_end_marker: bool,
    /// The version named by a `%YAML` directive.
    pub version: Option<Version>,
    pub tag_prefixes: Vec<TagPrefix>,
    pub anchors: Anchors,
    pub errors: Vec<YamlError>,
    pub warnings: Vec<Warning>,
    pub options: Options,
    pub range: Range,
}

impl Document {
    /// An unparsed document holding `contents`, stringified with default
    /// options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::{yaml, Document};
    ///
    /// let doc = Document::new(yaml!({ "name": "demo", "tags": ["a", "b"] }));
    /// assert_eq!(doc.to_string(), "name: demo\ntags:\n  - a\n  - b\n");
    /// ```
    #[must_use]
    pub fn new(contents: impl Into<Node>) -> Self {
        Document {
            contents: Some(contents.into()),
            ..Default::default()
        }
    }

    /// Resolves one CST document read from the normalized source `src`.
    #[must_use]
    pub fn parse(src: &str, cst: &cst::Document, options: Options) -> Self {
        Self::parse_after(src, cst, options, None)
    }

    /// Like [`Document::parse`]. A document without directives that
    /// follows a YAML 1.1 document inherits its version and `%TAG` handles.
    pub(crate) fn parse_after(
        src: &str,
        cst: &cst::Document,
        options: Options,
        prev: Option<&Document>,
    ) -> Self {
        let mut doc = Document {
            directives_end_marker: cst.directives_end_marker.is_some(),
            options,
            range: cst.value_range,
            ..Default::default()
        };
        if let Some(err) = &cst.error {
            doc.errors.push(err.clone());
        }
        doc.parse_directives(src, cst, prev);
        doc.parse_contents(src, cst);
        tracing::debug!(
            errors = doc.errors.len(),
            warnings = doc.warnings.len(),
            anchors = doc.anchors.len(),
            "resolved document"
        );
        doc
    }

    /// The version this document is read as.
    #[must_use]
    pub fn effective_version(&self) -> Version {
        self.version.unwrap_or(self.options.version)
    }

    /// The value of `key` when the contents are a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.contents.as_ref()?.as_map()?.get(key)
    }

    fn parse_directives(&mut self, src: &str, cst: &cst::Document, prev: Option<&Document>) {
        let mut comments = Vec::new();
        let mut has_directives = false;
        let mut has_yaml = false;
        for directive in &cst.directives {
            if let Some(err) = &directive.error {
                self.errors.push(err.clone());
            }
            if let Some(comment) = directive.comment(src) {
                comments.push(comment);
            }
            let NodeKind::Directive { name, parameters } = &directive.kind else {
                continue;
            };
            match name.as_str() {
                "TAG" => {
                    has_directives = true;
                    self.resolve_tag_directive(directive.range, parameters);
                }
                "YAML" | "YAML:1.0" => {
                    has_directives = true;
                    if has_yaml {
                        self.errors.push(
                            YamlError::semantic(
                                "The %YAML directive must only be given at most once per document.",
                            )
                            .with_range(directive.range),
                        );
                    }
                    has_yaml = true;
                    self.resolve_yaml_directive(directive.range, parameters);
                }
                _ => {
                    self.warnings.push(Warning::new(
                        format!("YAML only supports %TAG and %YAML directives, and not %{name}"),
                        Some(directive.range),
                    ));
                }
            }
        }
        if !comments.is_empty() {
            self.comment_before = Some(comments.join("\n"));
        }
        if let Some(prev) = prev {
            if !has_directives && prev.effective_version() == Version::V1_1 {
                self.tag_prefixes = prev.tag_prefixes.clone();
                self.version = prev.version;
            }
        }
    }

    fn resolve_tag_directive(&mut self, range: Range, parameters: &[String]) {
        let [handle, prefix, ..] = parameters else {
            self.errors.push(
                YamlError::semantic("Insufficient parameters given for %TAG directive")
                    .with_range(range),
            );
            return;
        };
        if self.tag_prefixes.iter().any(|p| &p.handle == handle) {
            let message = "The %TAG directive must only be given at most once per handle in the \
                           same document.";
            self.errors.push(YamlError::semantic(message).with_range(range));
            return;
        }
        tracing::trace!(handle = handle.as_str(), prefix = prefix.as_str(), "tag directive");
        self.tag_prefixes.push(TagPrefix::new(handle.as_str(), prefix.as_str()));
    }

    fn resolve_yaml_directive(&mut self, range: Range, parameters: &[String]) {
        let Some(version) = parameters.first() else {
            self.errors.push(
                YamlError::semantic("Insufficient parameters given for %YAML directive")
                    .with_range(range),
            );
            return;
        };
        match Version::parse(version) {
            Some(v) => self.version = Some(v),
            None => self.warnings.push(Warning::new(
                format!(
                    "Document will be parsed as YAML {} rather than YAML {version}",
                    self.options.version.as_str()
                ),
                Some(range),
            )),
        }
    }

    fn parse_contents(&mut self, src: &str, cst: &cst::Document) {
        let merge = self.options.merge_enabled_for(self.effective_version());
        let mut resolver = Resolver::new(src, &self.options, merge, &self.tag_prefixes);
        let mut before: Vec<String> = Vec::new();
        let mut after: Vec<String> = Vec::new();
        let mut comment_before = self.comment_before.take();
        let mut space_before = false;
        let mut body: Option<Node> = None;
        for node in &cst.contents {
            if node.has_value() {
                if body.is_some() {
                    let message =
                        "Document contains trailing content not separated by a ... or --- line";
                    resolver
                        .errors
                        .push(YamlError::syntax(message).with_range(node.range));
                    break;
                }
                let mut res = resolver.resolve_node(node);
                if space_before {
                    res.space_before = true;
                    space_before = false;
                }
                body = Some(res);
            } else if let Some(comment) = node.comment(src) {
                if body.is_none() {
                    before.push(comment);
                } else {
                    after.push(comment);
                }
            } else if node.kind == NodeKind::BlankLine {
                space_before = true;
                if body.is_none() && !before.is_empty() && comment_before.is_none() {
                    comment_before = Some(before.join("\n"));
                    before.clear();
                }
            }
        }
        let Resolver {
            anchors,
            errors,
            warnings,
            ..
        } = resolver;
        self.errors.extend(errors);
        self.warnings.extend(warnings);
        self.anchors = anchors;
        self.comment_before = comment_before;

        match body {
            None => {
                before.extend(after);
                self.comment = (!before.is_empty()).then(|| before.join("\n"));
            }
            Some(mut body) => {
                if !before.is_empty() {
                    prepend_comment_before(&mut body, before.join("\n"));
                }
                self.comment = (!after.is_empty()).then(|| after.join("\n"));
                self.anchors.link(&body);
                self.contents = Some(body);
            }
        }
    }
}

/// Leading document comments belong to the first item of a collection body.
fn prepend_comment_before(body: &mut Node, comment: String) {
    let join = |existing: Option<&str>| match existing {
        Some(existing) => format!("{comment}\n{existing}"),
        None => comment.clone(),
    };
    match &mut body.value {
        Value::Map(map) if !map.is_empty() => {
            let pair = map.items[0].pair_mut();
            let joined = join(pair.comment_before());
            pair.set_comment_before(Some(joined));
        }
        Value::Seq(seq) if !seq.is_empty() => {
            let first = &mut seq.items[0];
            first.comment_before = Some(join(first.comment_before.as_deref()));
        }
        _ => body.comment_before = Some(join(body.comment_before.as_deref())),
    }
}

fn collect_tags<'a>(node: &'a Node, tags: &mut Vec<&'a str>) {
    if let Some(tag) = node.tag.as_deref() {
        tags.push(tag);
    }
    match &node.value {
        Value::Map(map) => {
            for pair in map.pairs() {
                for child in pair.key.iter().chain(pair.value.iter()) {
                    collect_tags(child, tags);
                }
            }
        }
        Value::Seq(seq) => {
            for child in &seq.items {
                collect_tags(child, tags);
            }
        }
        Value::Scalar(_) | Value::Alias(_) => {}
    }
}

impl fmt::Display for Document {
    /// Stringifies the logical document: directives, a `---` line when the
    /// source had one or directives need it, comments and contents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        let mut has_directives = false;
        if let Some(version) = self.version {
            lines.push(format!("%YAML {}", version.as_str()));
            has_directives = true;
        }
        let mut tags = Vec::new();
        if let Some(contents) = &self.contents {
            collect_tags(contents, &mut tags);
        }
        for p in &self.tag_prefixes {
            if tags.iter().any(|tag| tag.starts_with(p.prefix.as_str())) {
                lines.push(format!("%TAG {} {}", p.handle, p.prefix));
                has_directives = true;
            }
        }
        if has_directives || self.directives_end_marker {
            lines.push("---".to_string());
        }
        if let Some(cb) = &self.comment_before {
            if has_directives || !self.directives_end_marker {
                lines.insert(0, String::new());
            }
            lines.insert(0, comment_lines(cb, ""));
        }

        let ctx = StringifyContext::new(&self.options, &self.tag_prefixes);
        let mut chomp_keep = false;
        let mut content_comment = None;
        if let Some(contents) = &self.contents {
            if contents.space_before && (has_directives || self.directives_end_marker) {
                lines.push(String::new());
            }
            if let Some(cb) = &contents.comment_before {
                lines.push(comment_lines(cb, ""));
            }
            content_comment = contents.comment.as_deref();
            let out = contents.stringify(&ctx);
            if out.comment_consumed {
                content_comment = None;
            }
            chomp_keep = out.chomp_keep && content_comment.is_none();
            lines.push(add_comment(&out.text, "", content_comment));
        }
        if let Some(comment) = &self.comment {
            let last_blank = lines.last().map_or(true, String::is_empty);
            if (!chomp_keep || content_comment.is_some()) && !last_blank {
                lines.push(String::new());
            }
            lines.push(comment_lines(comment, ""));
        }
        if lines.is_empty() {
            return Ok(());
        }
        writeln!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(src: &str) -> Document {
        let stream = cst::parse(src);
        Document::parse(&stream.src, &stream.documents[0], Options::default())
    }

    #[test]
    fn test_directives() {
        let doc = parse("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n---\n!e!thing x\n");
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);
        assert_eq!(doc.version, Some(Version::V1_1));
        assert_eq!(doc.tag_prefixes, vec![TagPrefix::new("!e!", "tag:example.com,2000:")]);
        let contents = doc.contents.as_ref().unwrap();
        assert_eq!(contents.tag.as_deref(), Some("tag:example.com,2000:thing"));
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_directive_errors() {
        let src = "%YAML 1.2\n%YAML 1.2\n%TAG !a! x:\n%TAG !a! y:\n%TAG !b!\n%FOO bar\n---\nx\n";
        let doc = parse(src);
        let messages: Vec<&str> = doc.errors.iter().map(YamlError::message).collect();
        assert_eq!(
            messages,
            vec![
                "The %YAML directive must only be given at most once per document.",
                "The %TAG directive must only be given at most once per handle in the same \
                 document.",
                "Insufficient parameters given for %TAG directive",
            ]
        );
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(
            doc.warnings[0].message,
            "YAML only supports %TAG and %YAML directives, and not %FOO"
        );
    }

    #[test]
    fn test_unknown_version_warns() {
        let doc = parse("%YAML 1.0\n---\nx\n");
        assert!(doc.version.is_none());
        assert_eq!(
            doc.warnings[0].message,
            "Document will be parsed as YAML 1.2 rather than YAML 1.0"
        );
    }

    #[test]
    fn test_document_comments() {
        let doc = parse("# intro\n\n# about a\na: 1\n# trailer\n");
        assert_eq!(doc.comment_before.as_deref(), Some(" intro"));
        let map = doc.contents.as_ref().and_then(Node::as_map).unwrap();
        assert_eq!(map.items[0].pair().comment_before(), Some(" about a"));
        assert!(doc.contents.as_ref().unwrap().space_before);
        assert_eq!(doc.comment.as_deref(), Some(" trailer"));
    }

    #[test]
    fn test_comment_only_document() {
        let doc = parse("# one\n# two\n");
        assert!(doc.contents.is_none());
        assert_eq!(doc.comment.as_deref(), Some(" one\n two"));
        assert_eq!(doc.to_string(), "# one\n# two\n");
    }

    #[test]
    fn test_trailing_content() {
        let doc = parse("\"a\"\nb\n");
        assert!(doc
            .errors
            .iter()
            .any(|e| e.kind() == ErrorKind::Syntax && e.message().contains("trailing content")));
        assert_eq!(doc.contents.as_ref().and_then(Node::as_str), Some("a"));
    }

    #[test]
    fn test_merge_follows_yaml_directive() {
        let src = "%YAML 1.1\n---\nbase: &b { x: 1 }\nderived: { <<: *b }\n";
        let doc = parse(src);
        let derived = doc.get("derived").and_then(Node::as_map).unwrap();
        assert!(derived.items[0].is_merge());
    }

    #[test]
    fn test_anchors_linked() {
        let doc = parse("a: &x [1]\nb: *x\n");
        let alias = doc.get("b").and_then(Node::as_alias).unwrap();
        let root = doc.contents.as_ref().unwrap();
        let target = doc.anchors.resolve(root, alias);
        assert_eq!(target.and_then(Node::as_seq).map(|s| s.len()), Some(1));
    }
}

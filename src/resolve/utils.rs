//! Helpers shared by the map and sequence resolvers.

use super::Resolver;
use crate::cst::{self, FlowItem, NodeKind, Range};
use crate::error::YamlError;
use crate::value::{MapItem, Node, Pair};

/// A blank line or comment line seen between collection items, waiting to
/// be attached once all items exist.
#[derive(Debug)]
pub(crate) struct CommentRecord {
    /// Seen after a key and before its value.
    pub(crate) after_key: bool,
    /// Index of the item that follows.
    pub(crate) before: usize,
    /// `None` for a blank line.
    pub(crate) comment: Option<String>,
}

trait CommentTarget {
    fn comment_before(&self) -> Option<&str>;
    fn set_comment_before(&mut self, comment: Option<String>);
    fn set_space_before(&mut self);
}

impl CommentTarget for Node {
    fn comment_before(&self) -> Option<&str> {
        self.comment_before.as_deref()
    }

    fn set_comment_before(&mut self, comment: Option<String>) {
        self.comment_before = comment;
    }

    fn set_space_before(&mut self) {
        self.space_before = true;
    }
}

impl CommentTarget for Pair {
    fn comment_before(&self) -> Option<&str> {
        Pair::comment_before(self)
    }

    fn set_comment_before(&mut self, comment: Option<String>) {
        Pair::set_comment_before(self, comment);
    }

    fn set_space_before(&mut self) {
        self.space_before = true;
    }
}

fn attach(target: &mut dyn CommentTarget, record: CommentRecord) {
    match record.comment {
        None => {
            if record.after_key || target.comment_before().is_none() {
                target.set_space_before();
            }
        }
        Some(comment) => {
            let joined = match target.comment_before() {
                Some(cb) => format!("{cb}\n{comment}"),
                None => comment,
            };
            target.set_comment_before(Some(joined));
        }
    }
}

fn append_comment(collection_comment: &mut Option<String>, comment: String) {
    *collection_comment = Some(match collection_comment.take() {
        Some(existing) => format!("{existing}\n{comment}"),
        None => comment,
    });
}

/// Attaches buffered records to map items. Returns the comment left over
/// for the map itself, from comments after its last item.
pub(crate) fn resolve_map_comments(
    items: &mut [MapItem],
    comments: Vec<CommentRecord>,
) -> Option<String> {
    let mut collection_comment = None;
    for record in comments {
        match items.get_mut(record.before) {
            None => {
                if let Some(comment) = record.comment {
                    append_comment(&mut collection_comment, comment);
                }
            }
            Some(item) => {
                let pair = item.pair_mut();
                if record.after_key && pair.value.is_some() {
                    if let Some(value) = pair.value.as_mut() {
                        attach(value, record);
                    }
                } else {
                    attach(pair, record);
                }
            }
        }
    }
    collection_comment
}

/// Attaches buffered records to sequence items.
pub(crate) fn resolve_seq_comments(
    items: &mut [Node],
    comments: Vec<CommentRecord>,
) -> Option<String> {
    let mut collection_comment = None;
    for record in comments {
        match items.get_mut(record.before) {
            None => {
                if let Some(comment) = record.comment {
                    append_comment(&mut collection_comment, comment);
                }
            }
            Some(item) => attach(item, record),
        }
    }
    collection_comment
}

/// The error for an overlong key: `The "first8...last8" key is too long`.
pub(crate) fn long_key_error(key: &Node) -> YamlError {
    let text = key.to_plain_string();
    let chars: Vec<char> = text.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
    YamlError::semantic(format!("The \"{head}...{tail}\" key is too long"))
}

/// Item ranges of a flow collection; indicator characters have none.
pub(crate) fn flow_item_ranges(items: &[FlowItem]) -> Vec<Option<Range>> {
    items
        .iter()
        .map(|item| match item {
            FlowItem::Node(node) => Some(node.range),
            FlowItem::Char { .. } => None,
        })
        .collect()
}

impl<'a> Resolver<'a> {
    /// Bounds the scan cost of implicit keys.
    ///
    /// The key ends where item `idx` starts. For an item without a range
    /// (a flow indicator) the end is estimated from the nearest earlier
    /// item that has one, at two bytes per skipped item.
    pub(crate) fn check_key_length(
        &mut self,
        collection: &cst::Node,
        ranges: &[Option<Range>],
        idx: usize,
        key: Option<&Node>,
        key_start: Option<usize>,
    ) {
        let (Some(key), Some(key_start)) = (key, key_start) else {
            return;
        };
        let key_end = ranges
            .get(idx)
            .copied()
            .flatten()
            .map(|r| r.start)
            .filter(|start| *start > 0)
            .or_else(|| {
                (0..idx)
                    .rev()
                    .find_map(|i| ranges.get(i).copied().flatten().map(|r| r.end + 2 * (idx - i)))
            });
        let Some(key_end) = key_end else {
            return;
        };
        if key_end > key_start + self.options.max_key_length {
            self.errors.push(long_key_error(key).with_range(collection.range));
        }
    }

    /// A flow collection must end with its closing bracket.
    pub(crate) fn check_flow_collection_end(&mut self, collection: &cst::Node, items: &[FlowItem]) {
        let (close, name) = match collection.kind {
            NodeKind::FlowMap(_) => ('}', "flow map"),
            NodeKind::FlowSeq(_) => (']', "flow sequence"),
            _ => return,
        };
        let last = items.iter().rev().find(|item| match item {
            FlowItem::Node(node) => node.kind != NodeKind::Comment,
            FlowItem::Char { .. } => true,
        });
        let offset = match last {
            Some(FlowItem::Char { ch, offset, .. }) if *ch != close => offset + 1,
            Some(FlowItem::Node(node)) => node.range.end,
            _ => return,
        };
        self.errors.push(
            YamlError::semantic(format!("Expected {name} to end with {close}"))
                .with_range(collection.range)
                .with_offset(offset),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(before: usize, comment: Option<&str>) -> CommentRecord {
        CommentRecord {
            after_key: false,
            before,
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn test_unmatched_comments_go_to_collection() {
        let mut items = vec![Node::from(1)];
        let comment = resolve_seq_comments(
            &mut items,
            vec![record(1, Some("a")), record(1, None), record(1, Some("b"))],
        );
        assert_eq!(comment.as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_blank_line_after_comment_is_not_space_before() {
        let mut items = vec![Node::from(1), Node::from(2)];
        let records = vec![record(0, Some("c")), record(0, None), record(1, None)];
        resolve_seq_comments(&mut items, records);
        assert_eq!(items[0].comment_before.as_deref(), Some("c"));
        assert!(!items[0].space_before);
        assert!(items[1].space_before);
    }

    #[test]
    fn test_after_key_targets_value() {
        let mut items = vec![MapItem::Pair(Pair::new("k", "v"))];
        let after_key = CommentRecord {
            after_key: true,
            before: 0,
            comment: Some("note".to_string()),
        };
        resolve_map_comments(&mut items, vec![after_key, record(0, Some("lead"))]);
        let pair = items[0].pair();
        assert_eq!(pair.value.as_ref().and_then(|v| v.comment_before.as_deref()), Some("note"));
        assert_eq!(pair.comment_before(), Some("lead"));
    }

    #[test]
    fn test_long_key_preview() {
        let key = Node::from("a".repeat(10) + &"z".repeat(10));
        let err = long_key_error(&key);
        assert_eq!(err.message(), "The \"aaaaaaaa...zzzzzzzz\" key is too long");
    }
}

//! Byte-level scanning helpers shared by the CST parsers.
//!
//! All offsets are byte offsets into the normalized source (line endings are
//! always `\n`). Indicator characters are ASCII, so scanning bytes never
//! splits a multi-byte character at a position the parsers slice on.

#[inline]
pub(crate) fn byte_at(src: &[u8], offset: usize) -> Option<u8> {
    src.get(offset).copied()
}

#[inline]
pub(crate) fn is_blank(ch: Option<u8>) -> bool {
    matches!(ch, None | Some(b'\n' | b'\t' | b' '))
}

#[inline]
pub(crate) fn is_flow_indicator(ch: u8) -> bool {
    matches!(ch, b',' | b'[' | b']' | b'{' | b'}')
}

pub(crate) fn end_of_white_space(src: &[u8], mut offset: usize) -> usize {
    while matches!(byte_at(src, offset), Some(b'\t' | b' ')) {
        offset += 1;
    }
    offset
}

pub(crate) fn end_of_indent(src: &[u8], mut offset: usize) -> usize {
    while byte_at(src, offset) == Some(b' ') {
        offset += 1;
    }
    offset
}

pub(crate) fn end_of_line(src: &[u8], mut offset: usize) -> usize {
    while let Some(ch) = byte_at(src, offset) {
        if ch == b'\n' {
            break;
        }
        offset += 1;
    }
    offset
}

pub(crate) fn start_of_line(src: &[u8], mut offset: usize) -> usize {
    while offset > 0 && src[offset - 1] != b'\n' {
        offset -= 1;
    }
    offset
}

/// Skips spaces, but leaves the offset on a preceding newline if the
/// current position is the first character of a line.
pub(crate) fn normalize_offset(src: &[u8], offset: usize) -> usize {
    match byte_at(src, offset) {
        None => offset,
        Some(b'\n') => end_of_white_space(src, offset),
        Some(_) if offset > 0 && src[offset - 1] == b'\n' => offset - 1,
        Some(_) => end_of_white_space(src, offset),
    }
}

/// `true` at end of input, or at a line-initial `---`/`...` marker.
///
/// With `sep` given only that marker character is accepted.
pub(crate) fn at_document_boundary(src: &[u8], offset: usize, sep: Option<u8>) -> bool {
    let Some(ch0) = byte_at(src, offset) else {
        return true;
    };
    if offset > 0 && src[offset - 1] != b'\n' {
        return false;
    }
    match sep {
        Some(sep) if ch0 != sep => return false,
        None if ch0 != b'-' && ch0 != b'.' => return false,
        _ => {}
    }
    if byte_at(src, offset + 1) != Some(ch0) || byte_at(src, offset + 2) != Some(ch0) {
        return false;
    }
    is_blank(byte_at(src, offset + 3))
}

/// After a comment or blank-line boundary, returns the offset of the next
/// comment or newline on this line, else `start`.
pub(crate) fn start_comment_or_end_blank_line(src: &[u8], start: usize) -> usize {
    let offset = end_of_white_space(src, start);
    match byte_at(src, offset) {
        Some(b'#' | b'\n') => offset,
        _ => start,
    }
}

/// Returns the end of the indentation on `line_start` if it is deeper than
/// `indent`, the end of the line if it is blank, else `None`.
pub(crate) fn end_of_block_indent(src: &[u8], indent: isize, line_start: usize) -> Option<usize> {
    let in_end = end_of_indent(src, line_start);
    if in_end as isize > line_start as isize + indent {
        return Some(in_end);
    }
    let ws_end = end_of_white_space(src, in_end);
    match byte_at(src, ws_end) {
        None | Some(b'\n') => Some(ws_end),
        _ => None,
    }
}

/// Whether the content after a collection item indicator is indented enough
/// to belong to the item.
pub(crate) fn next_node_is_indented(
    ch: Option<u8>,
    indent_diff: isize,
    indicator_as_indent: bool,
) -> bool {
    match ch {
        None => false,
        Some(_) if indent_diff < 0 => false,
        Some(_) if indent_diff > 0 => true,
        Some(ch) => indicator_as_indent && ch == b'-',
    }
}

/// Whether any content following the line at `offset` is indented to at
/// least `indent`, skipping comment and blank lines.
pub(crate) fn next_content_has_indent(src: &[u8], mut offset: usize, indent: isize) -> bool {
    loop {
        let line_start = end_of_line(src, offset) + 1;
        offset = end_of_indent(src, line_start);
        let Some(ch) = byte_at(src, offset) else {
            return false;
        };
        if offset as isize >= line_start as isize + indent {
            return true;
        }
        if ch != b'#' && ch != b'\n' {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_boundary() {
        let src = b"a\n---\n... x\n--x\n";
        assert!(!at_document_boundary(src, 0, None));
        assert!(at_document_boundary(src, 2, None));
        assert!(!at_document_boundary(src, 2, Some(b'.')));
        assert!(at_document_boundary(src, 6, Some(b'.')));
        assert!(!at_document_boundary(src, 12, None));
        assert!(at_document_boundary(src, src.len(), None));
    }

    #[test]
    fn test_normalize_offset() {
        let src = b"a  \nb";
        assert_eq!(normalize_offset(src, 1), 3);
        assert_eq!(normalize_offset(src, 4), 3);
    }

    #[test]
    fn test_next_content_has_indent() {
        let src = b"# c\n\n  # d\n  x\n";
        assert!(next_content_has_indent(src, 0, 2));
        assert!(!next_content_has_indent(b"# c\nx\n", 0, 2));
    }
}

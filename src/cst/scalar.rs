//! Scalar string values: line folding, quote unescaping and block scalar
//! chomping.

use super::node::{BlockHeader, Chomp, Node, NodeKind};
use crate::error::YamlError;

/// The cooked string value of a scalar node and any problems found while
/// reading it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrValue {
    pub value: String,
    pub errors: Vec<YamlError>,
}

impl StrValue {
    fn ok(value: String) -> Self {
        StrValue {
            value,
            errors: Vec::new(),
        }
    }
}

impl Node {
    /// The string value of a scalar node, or `None` for other node kinds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::cst::{Context, Parser};
    ///
    /// let src = "\"a\\tb\"";
    /// let node = Parser::new(src).parse_node(Context::default(), 0).unwrap();
    /// assert_eq!(node.str_value(src).unwrap().value, "a\tb");
    /// ```
    #[must_use]
    pub fn str_value(&self, src: &str) -> Option<StrValue> {
        let raw = self.raw_value(src);
        let mut result = match &self.kind {
            NodeKind::Plain => plain_value(raw),
            NodeKind::QuoteDouble => double_quoted_value(raw),
            NodeKind::QuoteSingle => single_quoted_value(raw),
            NodeKind::BlockLiteral(header) => {
                StrValue::ok(block_value(raw, *header, self.context.indent, false))
            }
            NodeKind::BlockFolded(header) => {
                StrValue::ok(block_value(raw, *header, self.context.indent, true))
            }
            _ => return None,
        };
        for err in &mut result.errors {
            *err = err.clone().with_range(self.range);
        }
        Some(result)
    }
}

fn plain_value(raw: &str) -> StrValue {
    let value = fold_lines(raw.lines().map(str::trim));
    let mut result = StrValue::ok(value);
    match raw.chars().next() {
        Some('\t') => result.errors.push(YamlError::semantic(
            "Plain value cannot start with a tab character",
        )),
        Some(ch @ ('@' | '`')) => result.errors.push(YamlError::semantic(format!(
            "Plain value cannot start with reserved character {ch}"
        ))),
        _ => {}
    }
    result
}

/// Joins lines with a space, turning each run of `n` empty lines into `n`
/// newlines.
fn fold_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut empty_run = 0;
    let mut first = true;
    for line in lines {
        if line.is_empty() && !first {
            empty_run += 1;
            continue;
        }
        if !first {
            if empty_run > 0 {
                out.extend(std::iter::repeat('\n').take(empty_run));
            } else {
                out.push(' ');
            }
        }
        out.push_str(line);
        empty_run = 0;
        first = false;
    }
    out
}

fn single_quoted_value(raw: &str) -> StrValue {
    let mut errors = Vec::new();
    let inner = match raw.strip_prefix('\'') {
        Some(rest) if rest.ends_with('\'') && !rest.is_empty() => &rest[..rest.len() - 1],
        Some(rest) => {
            errors.push(YamlError::syntax("Missing closing 'quote"));
            rest
        }
        None => raw,
    };
    let value = fold_quoted(&inner.replace("''", "'"));
    StrValue { value, errors }
}

fn fold_quoted(inner: &str) -> String {
    let lines: Vec<&str> = inner.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    let trimmed = lines.iter().enumerate().map(|(i, line)| {
        let line = if i > 0 { line.trim_start_matches([' ', '\t']) } else { line };
        if i < last {
            line.trim_end_matches([' ', '\t'])
        } else {
            line
        }
    });
    fold_lines(trimmed)
}

fn double_quoted_value(raw: &str) -> StrValue {
    let mut errors = Vec::new();
    let inner = match raw.strip_prefix('"') {
        Some(rest) if closes_quote(rest) => &rest[..rest.len() - 1],
        Some(rest) => {
            errors.push(YamlError::syntax("Missing closing \"quote"));
            rest
        }
        None => raw,
    };

    let mut out = String::new();
    // bytes of `out` produced by escapes, which folding must not trim
    let mut protected = 0;
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                let keep = out.trim_end_matches([' ', '\t']).len().max(protected);
                out.truncate(keep);
                let mut breaks = 0;
                loop {
                    while matches!(chars.peek(), Some(' ' | '\t')) {
                        chars.next();
                    }
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        breaks += 1;
                    } else {
                        break;
                    }
                }
                if breaks == 0 {
                    out.push(' ');
                } else {
                    out.extend(std::iter::repeat('\n').take(breaks));
                }
            }
            '\\' => {
                let Some(esc) = chars.next() else {
                    break;
                };
                match esc {
                    '\n' => {
                        while matches!(chars.peek(), Some(' ' | '\t')) {
                            chars.next();
                        }
                    }
                    '0' => out.push('\0'),
                    'a' => out.push('\x07'),
                    'b' => out.push('\x08'),
                    'e' => out.push('\x1b'),
                    'f' => out.push('\x0c'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' | '\t' => out.push('\t'),
                    'v' => out.push('\x0b'),
                    'N' => out.push('\u{85}'),
                    '_' => out.push('\u{a0}'),
                    'L' => out.push('\u{2028}'),
                    'P' => out.push('\u{2029}'),
                    ' ' => out.push(' '),
                    '"' => out.push('"'),
                    '/' => out.push('/'),
                    '\\' => out.push('\\'),
                    'x' | 'u' | 'U' => {
                        let len = match esc {
                            'x' => 2,
                            'u' => 4,
                            _ => 8,
                        };
                        let code: String = (0..len).filter_map(|_| chars.next()).collect();
                        match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                            Some(c) if code.len() == len => out.push(c),
                            _ => {
                                errors.push(YamlError::semantic(format!(
                                    "Invalid escape sequence \\{esc}{code}"
                                )));
                                out.push('\\');
                                out.push(esc);
                                out.push_str(&code);
                            }
                        }
                    }
                    other => {
                        errors.push(YamlError::semantic(format!(
                            "Invalid escape sequence \\{other}"
                        )));
                        out.push('\\');
                        out.push(other);
                    }
                }
                protected = out.len();
            }
            _ => out.push(ch),
        }
    }
    StrValue { value: out, errors }
}

/// Whether `rest` ends in a `"` preceded by an even number of backslashes.
fn closes_quote(rest: &str) -> bool {
    let Some(body) = rest.strip_suffix('"') else {
        return false;
    };
    let backslashes = body.bytes().rev().take_while(|b| *b == b'\\').count();
    backslashes % 2 == 0
}

/// `indent` is the context indent of the block scalar node; the header's
/// block indent is relative to it.
fn block_value(raw: &str, header: BlockHeader, indent: isize, folded: bool) -> String {
    let column = (indent + header.block_indent.unwrap_or(0) as isize).max(0) as usize;
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    if raw.is_empty() {
        return String::new();
    }
    let lines: Vec<&str> = body
        .split('\n')
        .map(|line| {
            let spaces = line.bytes().take(column).take_while(|b| *b == b' ').count();
            &line[spaces..]
        })
        .collect();
    let content_end = lines
        .iter()
        .rposition(|line| !line.trim_matches([' ', '\t']).is_empty())
        .map_or(0, |i| i + 1);
    let trailing = lines.len() - content_end;
    let content = &lines[..content_end];

    let mut out = if folded {
        fold_block(content)
    } else {
        content.join("\n")
    };
    match header.chomping {
        Chomp::Strip => {}
        Chomp::Clip => {
            if !out.is_empty() {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            if content_end > 0 {
                out.push('\n');
            }
            out.extend(std::iter::repeat('\n').take(trailing));
        }
    }
    out
}

fn fold_block(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut empty_run = 0;
    let mut started = false;
    let mut prev_more_indented = false;
    for line in lines {
        if line.is_empty() {
            empty_run += 1;
            continue;
        }
        let more_indented = line.starts_with([' ', '\t']);
        if !started {
            out.extend(std::iter::repeat('\n').take(empty_run));
        } else if more_indented || prev_more_indented {
            out.extend(std::iter::repeat('\n').take(empty_run + 1));
        } else if empty_run > 0 {
            out.extend(std::iter::repeat('\n').take(empty_run));
        } else {
            out.push(' ');
        }
        out.push_str(line);
        empty_run = 0;
        started = true;
        prev_more_indented = more_indented;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{Context, Parser};

    fn value(src: &str) -> String {
        Parser::new(src)
            .parse_node(Context::default(), 0)
            .and_then(|node| node.str_value(src))
            .map(|v| v.value)
            .unwrap()
    }

    #[test]
    fn test_plain_folding() {
        assert_eq!(value("a\n b\n\n c"), "a b\nc");
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(value(r#""a\nbé\\""#), "a\nb\u{e9}\\");
        assert_eq!(value("\"one\n  two\""), "one two");
        assert_eq!(value("\"a\\\n  b\""), "ab");
    }

    #[test]
    fn test_missing_quote() {
        let src = "\"abc";
        let node = Parser::new(src).parse_node(Context::default(), 0).unwrap();
        let value = node.str_value(src).unwrap();
        assert_eq!(value.errors[0].message(), "Missing closing \"quote");
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(value("'it''s'"), "it's");
    }

    #[test]
    fn test_block_literal_chomping() {
        assert_eq!(value("|\n  a\n  b\n\n"), "a\nb\n");
        assert_eq!(value("|-\n  a\n"), "a");
        assert_eq!(value("|+\n  a\n\n"), "a\n\n");
    }

    #[test]
    fn test_block_folded() {
        assert_eq!(value(">\n  a\n  b\n\n  c\n"), "a b\nc\n");
        assert_eq!(value(">\n  a\n    b\n  c\n"), "a\n  b\nc\n");
    }
}

//! Error and warning types collected while parsing and resolving YAML.
//!
//! Parsing never aborts. Every problem found is appended to an ordered list
//! owned by the document, and the parser keeps going with a best-effort
//! fallback so a single pass reports as many problems as possible.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: the grammar was violated (unexpected indicator,
//!   malformed document end marker line, missing flow separators)
//! - **Semantic Errors**: the grammar was satisfied but the meaning is invalid
//!   (duplicate keys, oversized keys, multi-line implicit keys, illegal merge
//!   targets)
//! - **Reference Errors**: an alias names an anchor that was never defined
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::{parse_document, ErrorKind};
//!
//! let doc = parse_document("{ a: 1, a: 2 }");
//! assert_eq!(doc.errors.len(), 1);
//! assert_eq!(doc.errors[0].kind(), ErrorKind::Semantic);
//! assert!(doc.errors[0].message().contains("must be unique"));
//! ```

use crate::cst::Range;
use std::fmt;
use thiserror::Error;

/// The category of a [`YamlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    Reference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => f.write_str("syntax"),
            ErrorKind::Semantic => f.write_str("semantic"),
            ErrorKind::Reference => f.write_str("reference"),
        }
    }
}

/// A structural or semantic problem found in the source.
///
/// `range` is the source range of the offending node, when known. `offset`
/// is an exact byte offset for errors that point at a single indicator,
/// such as a missing or unexpected flow collection separator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YamlError {
    #[error("Syntax error: {message}")]
    Syntax {
        message: String,
        range: Option<Range>,
        offset: Option<usize>,
    },

    #[error("Semantic error: {message}")]
    Semantic {
        message: String,
        range: Option<Range>,
        offset: Option<usize>,
    },

    #[error("Reference error: {message}")]
    Reference {
        message: String,
        range: Option<Range>,
        offset: Option<usize>,
    },
}

impl YamlError {
    /// Creates a syntax error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::{YamlError, ErrorKind};
    ///
    /// let err = YamlError::syntax("Flow map contains an unexpected ]").with_offset(7);
    /// assert_eq!(err.kind(), ErrorKind::Syntax);
    /// assert_eq!(err.offset(), Some(7));
    /// ```
    pub fn syntax(message: impl Into<String>) -> Self {
        YamlError::Syntax {
            message: message.into(),
            range: None,
            offset: None,
        }
    }

    /// Creates a semantic error.
    pub fn semantic(message: impl Into<String>) -> Self {
        YamlError::Semantic {
            message: message.into(),
            range: None,
            offset: None,
        }
    }

    /// Creates a reference error (unknown alias target).
    pub fn reference(message: impl Into<String>) -> Self {
        YamlError::Reference {
            message: message.into(),
            range: None,
            offset: None,
        }
    }

    /// Attaches the source range of the offending node.
    #[must_use]
    pub fn with_range(mut self, source: Range) -> Self {
        match &mut self {
            YamlError::Syntax { range, .. }
            | YamlError::Semantic { range, .. }
            | YamlError::Reference { range, .. } => *range = Some(source),
        }
        self
    }

    /// Attaches an exact byte offset.
    #[must_use]
    pub fn with_offset(mut self, at: usize) -> Self {
        match &mut self {
            YamlError::Syntax { offset, .. }
            | YamlError::Semantic { offset, .. }
            | YamlError::Reference { offset, .. } => *offset = Some(at),
        }
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            YamlError::Syntax { .. } => ErrorKind::Syntax,
            YamlError::Semantic { .. } => ErrorKind::Semantic,
            YamlError::Reference { .. } => ErrorKind::Reference,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            YamlError::Syntax { message, .. }
            | YamlError::Semantic { message, .. }
            | YamlError::Reference { message, .. } => message,
        }
    }

    #[must_use]
    pub fn range(&self) -> Option<Range> {
        match self {
            YamlError::Syntax { range, .. }
            | YamlError::Semantic { range, .. }
            | YamlError::Reference { range, .. } => *range,
        }
    }

    /// The exact offset if one was recorded, else the start of the range.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            YamlError::Syntax { offset, range, .. }
            | YamlError::Semantic { offset, range, .. }
            | YamlError::Reference { offset, range, .. } => {
                offset.or_else(|| range.map(|r| r.start))
            }
        }
    }

    /// 1-based line and column of [`YamlError::offset`] within `src`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lossless_yaml::YamlError;
    ///
    /// let err = YamlError::syntax("bad").with_offset(6);
    /// assert_eq!(err.line_col("a: 1\nb: 2"), Some((2, 2)));
    /// ```
    #[must_use]
    pub fn line_col(&self, src: &str) -> Option<(usize, usize)> {
        let offset = self.offset()?.min(src.len());
        let before = src.get(..offset)?;
        let line = before.matches('\n').count() + 1;
        let col = before.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
        Some((line, col))
    }
}

/// A non-fatal diagnostic, such as an unknown directive or tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Warning: {message}")]
pub struct Warning {
    pub message: String,
    pub range: Option<Range>,
}

impl Warning {
    pub fn new(message: impl Into<String>, range: Option<Range>) -> Self {
        Warning {
            message: message.into(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_falls_back_to_range() {
        let err = YamlError::semantic("x").with_range(Range::new(4, 9));
        assert_eq!(err.offset(), Some(4));
        let err = err.with_offset(6);
        assert_eq!(err.offset(), Some(6));
        assert_eq!(err.range(), Some(Range::new(4, 9)));
    }

    #[test]
    fn test_display() {
        let err = YamlError::reference("Aliased anchor not found: a");
        assert_eq!(err.to_string(), "Reference error: Aliased anchor not found: a");
        assert_eq!(ErrorKind::Semantic.to_string(), "semantic");
    }
}

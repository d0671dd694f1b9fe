//! Configuration options for resolving and stringifying documents.
//!
//! - [`Options`]: main configuration struct
//! - [`Version`]: the YAML version a document is read as, which also picks
//!   the default for `<<` merge keys
//!
//! ## Examples
//!
//! ```rust
//! use lossless_yaml::{parse_document_with, Options, Version};
//!
//! let src = "base: &b { x: 1 }\nderived: { <<: *b, y: 2 }\n";
//!
//! // merge keys are off by default for YAML 1.2
//! let doc = parse_document_with(src, Options::new());
//! assert!(doc.errors.is_empty());
//!
//! // YAML 1.1 turns them on
//! let options = Options::new().with_version(Version::V1_1);
//! assert!(options.merge_enabled());
//! ```

/// The YAML version used to resolve a document.
///
/// A `%YAML` directive overrides it per document.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::Version;
///
/// assert_eq!(Version::V1_1.as_str(), "1.1");
/// assert_eq!(Version::parse("1.2"), Some(Version::V1_2));
/// assert_eq!(Version::parse("2.0"), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Version {
    V1_1,
    #[default]
    V1_2,
}

impl Version {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Version::V1_1 => "1.1",
            Version::V1_2 => "1.2",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Version> {
        match s {
            "1.1" => Some(Version::V1_1),
            "1.2" => Some(Version::V1_2),
            _ => None,
        }
    }
}

/// Options for resolving and stringifying documents.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::Options;
///
/// let options = Options::new()
///     .with_merge(true)
///     .with_indent(4)
///     .with_null_str("~");
/// assert!(options.merge_enabled());
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub version: Version,
    /// Whether `<<` keys are merge keys. `None` follows the version.
    pub merge: Option<bool>,
    /// Spaces per nesting level in stringified output.
    pub indent: usize,
    /// Keys spanning more bytes than this are reported.
    pub max_key_length: usize,
    /// Text written for null values that have no source text.
    pub null_str: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            version: Version::default(),
            merge: None,
            indent: 2,
            max_key_length: 1024,
            null_str: "null".to_string(),
        }
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Explicitly enables or disables merge keys.
    #[must_use]
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = Some(merge);
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Default is 2. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    #[must_use]
    pub fn with_max_key_length(mut self, max: usize) -> Self {
        self.max_key_length = max;
        self
    }

    #[must_use]
    pub fn with_null_str(mut self, null_str: impl Into<String>) -> Self {
        self.null_str = null_str.into();
        self
    }

    /// Whether `<<` is a merge key under these options.
    #[must_use]
    pub fn merge_enabled(&self) -> bool {
        self.merge_enabled_for(self.version)
    }

    /// Like [`Options::merge_enabled`], for a document whose `%YAML`
    /// directive selected `version`.
    #[must_use]
    pub fn merge_enabled_for(&self, version: Version) -> bool {
        self.merge.unwrap_or(version == Version::V1_1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.version, Version::V1_2);
        assert_eq!(options.indent, 2);
        assert_eq!(options.max_key_length, 1024);
        assert_eq!(options.null_str, "null");
        assert!(!options.merge_enabled());
    }

    #[test]
    fn test_merge_follows_version_unless_set() {
        assert!(Options::new().merge_enabled_for(Version::V1_1));
        assert!(!Options::new().with_merge(false).merge_enabled_for(Version::V1_1));
        assert!(Options::new().with_merge(true).merge_enabled());
    }

    #[test]
    fn test_indent_floor() {
        assert_eq!(Options::new().with_indent(0).indent, 1);
    }
}

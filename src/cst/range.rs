//! Byte ranges into the (normalized) source buffer.

/// A half-open byte interval `[start, end)` into the source buffer.
///
/// `orig_start` and `orig_end` stay `None` until [`Range::set_orig_range`]
/// rebases the range against the offsets of removed carriage returns.
///
/// # Examples
///
/// ```rust
/// use lossless_yaml::cst::Range;
///
/// let range = Range::new(2, 5);
/// assert_eq!(range.len(), 3);
/// assert!(!range.is_empty());
/// assert!(Range::at(4).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub orig_start: Option<usize>,
    pub orig_end: Option<usize>,
}

impl Range {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Range {
            start,
            end,
            orig_start: None,
            orig_end: None,
        }
    }

    /// A zero-width range at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Range::new(offset, offset)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if `offset` falls inside this range.
    #[inline]
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The slice of `src` covered by this range, clamped to the buffer.
    #[must_use]
    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        let end = self.end.min(src.len());
        let start = self.start.min(end);
        src.get(start..end).unwrap_or("")
    }

    /// Sets `orig_start` and `orig_end` from the sorted list `cr` of
    /// normalized offsets at which a `\r` was removed.
    ///
    /// `offset` is the index into `cr` at which scanning may start; the
    /// returned index is where the next (later) range may start scanning.
    /// Callers must visit ranges in ascending source order.
    pub fn set_orig_range(&mut self, cr: &[usize], offset: usize) -> usize {
        if cr.is_empty() || self.end <= cr[0] {
            self.orig_start = Some(self.start);
            self.orig_end = Some(self.end);
            return offset;
        }
        let mut i = offset;
        while i < cr.len() && cr[i] <= self.start {
            i += 1;
        }
        self.orig_start = Some(self.start + i);
        let next_offset = i;
        while i < cr.len() && cr[i] < self.end {
            i += 1;
        }
        self.orig_end = Some(self.end + i);
        next_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orig_range_without_carriage_returns() {
        let mut range = Range::new(3, 7);
        assert_eq!(range.set_orig_range(&[], 0), 0);
        assert_eq!(range.orig_start, Some(3));
        assert_eq!(range.orig_end, Some(7));
    }

    #[test]
    fn test_orig_range_shifts_past_removed_bytes() {
        // "a\r\nb\r\nc" normalizes to "a\nb\nc" with removals at 1 and 3
        let cr = [1, 3];
        let mut b = Range::new(2, 3);
        let next = b.set_orig_range(&cr, 0);
        assert_eq!(b.orig_start, Some(3));
        assert_eq!(b.orig_end, Some(4));
        let mut c = Range::new(4, 5);
        c.set_orig_range(&cr, next);
        assert_eq!(c.orig_start, Some(6));
        assert_eq!(c.orig_end, Some(7));
    }

    #[test]
    fn test_slice_is_clamped() {
        assert_eq!(Range::new(2, 10).slice("abcd"), "cd");
        assert_eq!(Range::new(6, 10).slice("abcd"), "");
    }
}

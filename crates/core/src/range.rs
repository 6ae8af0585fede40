//! Half-open id interval.

use crate::element::RowId;
use core::fmt;

/// A half-open interval `[start, end)` of row ids.
///
/// Used both for a table's valid id space and for the added/removed deltas
/// accumulated since the last evaluation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: RowId,
    pub end: RowId,
}

impl Range {
    /// Creates a range. An inverted pair is clamped to an empty range at `start`.
    #[inline]
    pub fn new(start: RowId, end: RowId) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Creates an empty range positioned at `at`.
    #[inline]
    pub const fn empty_at(at: RowId) -> Self {
        Self { start: at, end: at }
    }

    /// Returns `end - start`.
    #[inline]
    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn contains(&self, id: RowId) -> bool {
        id >= self.start && id < self.end
    }

    /// Returns the overlap of two ranges (empty if they are disjoint).
    pub fn intersect(&self, other: &Range) -> Range {
        Range::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Iterates over the ids of this range in increasing order.
    #[inline]
    pub fn ids(&self) -> core::ops::Range<RowId> {
        self.start..self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn test_range_length() {
        let r = Range::new(3, 8);
        assert_eq!(r.length(), 5);
        assert!(!r.is_empty());
        assert!(Range::empty_at(4).is_empty());
    }

    #[test]
    fn test_range_inverted_is_empty() {
        let r = Range::new(8, 3);
        assert!(r.is_empty());
        assert_eq!(r.start, 8);
    }

    #[test]
    fn test_range_contains_half_open() {
        let r = Range::new(0, 2);
        assert!(r.contains(0));
        assert!(r.contains(1));
        assert!(!r.contains(2));
        assert!(!r.contains(-1));
    }

    #[test]
    fn test_range_intersect() {
        let a = Range::new(0, 10);
        assert_eq!(a.intersect(&Range::new(5, 20)), Range::new(5, 10));
        assert!(a.intersect(&Range::new(12, 20)).is_empty());
    }

    #[test]
    fn test_range_ids() {
        let ids: Vec<_> = Range::new(2, 5).ids().collect();
        assert_eq!(ids, [2, 3, 4]);
        assert_eq!(Range::new(2, 5).to_string(), "[2, 5)");
    }
}

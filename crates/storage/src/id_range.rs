//! Id-range store for a single table.
//!
//! Rows are appended at the high end and removed from the low end only, so the
//! valid ids always form one interval and the delta since the last commit is two
//! intervals as well.

use colflow_core::{Range, RowId};

/// Tracks a table's valid id interval and its delta since the last commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdRangeStore {
    removed_end: RowId,
    added_end: RowId,
    /// `removed_end` as of the last commit.
    committed_removed_end: RowId,
    /// `added_end` as of the last commit.
    committed_added_end: RowId,
}

impl IdRangeStore {
    /// Creates an empty id space starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the valid ids `[removed_end, added_end)`.
    #[inline]
    pub fn id_range(&self) -> Range {
        Range::new(self.removed_end, self.added_end)
    }

    /// Returns the number of valid ids.
    #[inline]
    pub fn len(&self) -> usize {
        (self.added_end - self.removed_end) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added_end == self.removed_end
    }

    /// Ids appended since the last commit (some may have been removed again).
    #[inline]
    pub fn added_range(&self) -> Range {
        Range::new(self.committed_added_end, self.added_end)
    }

    /// Ids removed since the last commit.
    #[inline]
    pub fn removed_range(&self) -> Range {
        Range::new(self.committed_removed_end, self.removed_end)
    }

    /// Returns true if ids were added or removed since the last commit.
    #[inline]
    pub fn is_changed(&self) -> bool {
        !self.added_range().is_empty() || !self.removed_range().is_empty()
    }

    /// Appends `count` new ids and returns them. The id space saturates at
    /// `RowId::MAX`, so the returned range may be shorter than `count`.
    pub fn add(&mut self, count: usize) -> Range {
        let start = self.added_end;
        let count = RowId::try_from(count).unwrap_or(RowId::MAX);
        self.added_end = self.added_end.saturating_add(count);
        Range::new(start, self.added_end)
    }

    /// Removes up to `count` of the oldest ids and returns them.
    pub fn remove(&mut self, count: usize) -> Range {
        let count = count.min(self.len()) as RowId;
        let start = self.removed_end;
        self.removed_end += count;
        Range::new(start, self.removed_end)
    }

    /// Removes every valid id and returns them.
    pub fn remove_all(&mut self) -> Range {
        self.remove(self.len())
    }

    /// Makes the current state the new baseline: both deltas become empty.
    pub fn commit(&mut self) {
        self.committed_removed_end = self.removed_end;
        self.committed_added_end = self.added_end;
    }
}

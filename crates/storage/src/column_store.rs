//! Column storage for a single column.
//!
//! Values are kept for a contiguous window of ids starting at `start`. The window
//! grows at the high end as the table appends rows and is trimmed at the low end
//! only on commit, so rows removed during the current pass stay readable until
//! the pass is over.

use alloc::collections::VecDeque;
use colflow_core::{Range, RowId, Value};

/// Cell values of one column over its input table's id window.
#[derive(Clone, Debug)]
pub struct ColumnStore {
    values: VecDeque<Value>,
    /// Id of `values[0]`.
    start: RowId,
    default: Value,
    changed: bool,
}

impl ColumnStore {
    /// Creates an empty store whose unset cells read as `default`.
    pub fn new(default: Value) -> Self {
        Self {
            values: VecDeque::new(),
            start: 0,
            default,
            changed: false,
        }
    }

    /// Returns the default value.
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Replaces the default value. Stored cells are not touched.
    pub fn set_default(&mut self, default: Value) {
        self.default = default;
    }

    /// Ids that currently have a stored cell.
    #[inline]
    pub fn stored_range(&self) -> Range {
        Range::new(self.start, self.start + self.values.len() as RowId)
    }

    /// Returns the value at `id`, or the default for ids without a stored cell.
    pub fn get(&self, id: RowId) -> &Value {
        match self.slot(id) {
            Some(idx) => &self.values[idx],
            None => &self.default,
        }
    }

    /// Writes `value` at `id`. Returns false if `id` has no stored cell.
    pub fn set(&mut self, id: RowId, value: Value) -> bool {
        match self.slot(id) {
            Some(idx) => {
                self.values[idx] = value;
                self.changed = true;
                true
            }
            None => false,
        }
    }

    /// Writes `value` into every stored cell of `range`.
    pub fn fill(&mut self, range: Range, value: &Value) {
        for id in range.intersect(&self.stored_range()).ids() {
            if let Some(idx) = self.slot(id) {
                self.values[idx] = value.clone();
            }
        }
        self.changed = true;
    }

    /// Resets every stored cell of `range` to the default value.
    pub fn reset(&mut self, range: Range) {
        let default = self.default.clone();
        self.fill(range, &default);
    }

    /// Appends default cells until the store covers ids up to `end`.
    pub fn extend_to(&mut self, end: RowId) {
        while self.start + (self.values.len() as RowId) < end {
            self.values.push_back(self.default.clone());
        }
    }

    /// Drops cells of ids below `start`.
    pub fn trim_to(&mut self, start: RowId) {
        while self.start < start {
            if self.values.pop_front().is_none() {
                self.start = start;
                break;
            }
            self.start += 1;
        }
    }

    /// Returns true if any cell was written since the last `clear_changed`.
    #[inline]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    #[inline]
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    fn slot(&self, id: RowId) -> Option<usize> {
        if id < self.start {
            return None;
        }
        let idx = (id - self.start) as usize;
        (idx < self.values.len()).then_some(idx)
    }
}

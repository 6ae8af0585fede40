//! Table arena entries.

use super::ElementState;
use crate::definition::{Population, PopulationKind};
use alloc::string::String;
use alloc::vec::Vec;
use colflow_core::{ColumnId, DefinitionError, EvalError, Range, RowId, TableId};
use colflow_storage::IdRangeStore;

/// A table: an id space plus the columns whose input it is.
pub struct Table {
    pub(crate) id: TableId,
    pub(crate) name: String,
    pub(crate) ids: IdRangeStore,
    pub(crate) columns: Vec<ColumnId>,
    pub(crate) population: Option<Population>,
    /// End of the id range as of the last evaluation call. Writes below it touch
    /// rows that evaluations may already have read.
    pub(crate) settled_end: RowId,
    pub(crate) state: ElementState,
}

impl Table {
    pub(crate) fn new(id: TableId, name: String, created_at: u64) -> Self {
        Self {
            id,
            name,
            ids: IdRangeStore::new(),
            columns: Vec::new(),
            population: None,
            settled_end: 0,
            state: ElementState::created(created_at),
        }
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Valid ids `[removed_end, added_end)`.
    #[inline]
    pub fn id_range(&self) -> Range {
        self.ids.id_range()
    }

    /// Ids appended since the last evaluation pass.
    #[inline]
    pub fn added_range(&self) -> Range {
        self.ids.added_range()
    }

    /// Ids removed since the last evaluation pass.
    #[inline]
    pub fn removed_range(&self) -> Range {
        self.ids.removed_range()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Columns whose input is this table, in creation order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    pub fn population_kind(&self) -> PopulationKind {
        self.population
            .as_ref()
            .map_or(PopulationKind::None, Population::kind)
    }

    pub fn definition_errors(&self) -> &[DefinitionError] {
        &self.state.definition_errors
    }

    pub fn evaluation_errors(&self) -> &[EvalError] {
        &self.state.evaluation_errors
    }

    #[inline]
    pub fn definition_changed_at(&self) -> u64 {
        self.state.definition_changed_at
    }

    #[inline]
    pub fn data_changed_at(&self) -> u64 {
        self.state.data_changed_at
    }
}

impl core::fmt::Debug for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("ids", &self.ids.id_range())
            .field("population", &self.population_kind())
            .finish()
    }
}

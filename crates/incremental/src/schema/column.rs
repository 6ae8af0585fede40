//! Column arena entries.

use super::ElementState;
use crate::definition::{ColumnDefinition, ColumnKind};
use alloc::string::String;
use colflow_core::{ColumnId, ColumnType, DefinitionError, EvalError, Range, RowId, TableId, Value};
use colflow_storage::ColumnStore;

/// How far a cursor-driven evaluation has synchronized its column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    /// Input (or fact) ids covered by the last successful evaluation.
    pub rows: Range,
    /// Group ids initialized by the last successful accumulate evaluation.
    pub groups: Range,
}

impl Cursor {
    pub(crate) fn rows(rows: Range) -> Self {
        Self {
            rows,
            groups: Range::default(),
        }
    }
}

/// A column: a value function over its input table's id space.
pub struct Column {
    pub(crate) id: ColumnId,
    pub(crate) name: String,
    pub(crate) input: TableId,
    pub(crate) output: ColumnType,
    pub(crate) key: bool,
    pub(crate) data: ColumnStore,
    pub(crate) definition: Option<ColumnDefinition>,
    pub(crate) cursor: Option<Cursor>,
    /// Last time values of rows that already existed were overwritten.
    pub(crate) rewritten_at: u64,
    pub(crate) state: ElementState,
}

impl Column {
    pub(crate) fn new(
        id: ColumnId,
        input: TableId,
        name: String,
        output: ColumnType,
        key: bool,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            name,
            input,
            output,
            key,
            data: ColumnStore::new(Value::default_for_column(output)),
            definition: None,
            cursor: None,
            rewritten_at: 0,
            state: ElementState::created(created_at),
        }
    }

    #[inline]
    pub fn id(&self) -> ColumnId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table whose ids this column is defined over.
    #[inline]
    pub fn input(&self) -> TableId {
        self.input
    }

    #[inline]
    pub fn output(&self) -> ColumnType {
        self.output
    }

    /// Returns true for key columns, whose values identify rows of the table.
    #[inline]
    pub fn is_key(&self) -> bool {
        self.key
    }

    pub fn default_value(&self) -> &Value {
        self.data.default_value()
    }

    /// Raw cell access. Ids outside the input table's range read as the default.
    pub fn get(&self, id: RowId) -> &Value {
        self.data.get(id)
    }

    pub fn definition(&self) -> Option<&ColumnDefinition> {
        self.definition.as_ref()
    }

    pub fn kind(&self) -> ColumnKind {
        self.definition
            .as_ref()
            .map_or(ColumnKind::Noop, ColumnDefinition::kind)
    }

    /// Returns true if the engine computes this column's values.
    #[inline]
    pub fn is_derived(&self) -> bool {
        self.definition.is_some()
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

impl core::fmt::Debug for Column {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("kind", &self.kind())
            .finish()
    }
}

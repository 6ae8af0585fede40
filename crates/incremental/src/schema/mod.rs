//! The schema: arenas of tables and columns plus the logical clock.
//!
//! Elements reference each other by arena index only. Every mutation, definition
//! change and element evaluation advances the clock, and the resulting
//! timestamps drive dirtiness.

mod column;
mod define;
mod mutate;
mod table;

pub use column::Column;
pub(crate) use column::Cursor;
pub use table::Table;

use crate::config::EngineConfig;
use crate::dataflow::Topology;
use alloc::string::String;
use alloc::vec::Vec;
use colflow_core::{
    ColumnId, ColumnType, DefinitionError, ElementId, Error, EvalError, Range, Result, RowId,
    TableId, Value,
};

/// Change timestamps and error lists shared by tables and columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ElementState {
    pub definition_changed_at: u64,
    pub data_changed_at: u64,
    pub definition_errors: Vec<DefinitionError>,
    pub evaluation_errors: Vec<EvalError>,
}

impl ElementState {
    fn created(at: u64) -> Self {
        Self {
            definition_changed_at: at,
            ..Self::default()
        }
    }

    #[inline]
    pub(crate) fn has_errors(&self) -> bool {
        !self.definition_errors.is_empty() || !self.evaluation_errors.is_empty()
    }
}

/// A set of tables and columns evaluated together.
///
/// Callers must serialize all mutation and evaluation calls on one schema.
pub struct Schema {
    pub(crate) tables: Vec<Table>,
    pub(crate) columns: Vec<Column>,
    clock: u64,
    pub(crate) topology: Option<Topology>,
    config: EngineConfig,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Creates an empty schema with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tables: Vec::new(),
            columns: Vec::new(),
            clock: 0,
            topology: None,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current value of the logical clock.
    #[inline]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    #[inline]
    pub(crate) fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    // ========== Arenas ==========

    /// Creates an empty, non-derived table.
    pub fn create_table(&mut self, name: impl Into<String>) -> TableId {
        let id = self.tables.len();
        let now = self.tick();
        self.tables.push(Table::new(id, name.into(), now));
        id
    }

    /// Creates a non-derived column over `input`.
    pub fn create_column(
        &mut self,
        input: TableId,
        name: impl Into<String>,
        output: ColumnType,
    ) -> Result<ColumnId> {
        self.push_column(input, name.into(), output, false)
    }

    /// Creates a key column: its values identify the rows of `input` for link,
    /// project and product searches.
    pub fn create_key_column(
        &mut self,
        input: TableId,
        name: impl Into<String>,
        output: ColumnType,
    ) -> Result<ColumnId> {
        self.push_column(input, name.into(), output, true)
    }

    fn push_column(
        &mut self,
        input: TableId,
        name: String,
        output: ColumnType,
        key: bool,
    ) -> Result<ColumnId> {
        let live = self.table(input)?.id_range();
        if let Some(target) = output.table() {
            self.table(target)?;
        }
        let id = self.columns.len();
        let now = self.tick();
        let mut column = Column::new(id, input, name, output, key, now);
        column.data.trim_to(live.start);
        column.data.extend_to(live.end);
        self.columns.push(column);
        self.tables[input].columns.push(id);
        Ok(id)
    }

    pub fn table(&self, id: TableId) -> Result<&Table> {
        self.tables.get(id).ok_or_else(|| Error::table_not_found(id))
    }

    pub fn column(&self, id: ColumnId) -> Result<&Column> {
        self.columns.get(id).ok_or_else(|| Error::column_not_found(id))
    }

    /// Looks up a table by name.
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.tables.iter().position(|t| t.name == name)
    }

    /// Looks up a column of `table` by name.
    pub fn column_id(&self, table: TableId, name: &str) -> Option<ColumnId> {
        let table = self.tables.get(table)?;
        table
            .columns
            .iter()
            .copied()
            .find(|&c| self.columns[c].name == name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter()
    }

    /// Returns the value of `column` at `id`, which must be a live id of its input table.
    pub fn value(&self, column: ColumnId, id: RowId) -> Result<&Value> {
        let col = self.column(column)?;
        let range = self.tables[col.input].id_range();
        if !range.contains(id) {
            return Err(Error::RowOutOfRange {
                table: col.input,
                row: id,
                range,
            });
        }
        Ok(col.data.get(id))
    }

    /// Returns the values of `column` for every live id of its input table, in id order.
    pub fn values(&self, column: ColumnId) -> Result<Vec<Value>> {
        let col = self.column(column)?;
        let range = self.tables[col.input].id_range();
        Ok(range.ids().map(|id| col.data.get(id).clone()).collect())
    }

    // ========== Elements ==========

    /// Returns true if `element` names a table or column of this schema.
    pub fn contains(&self, element: ElementId) -> bool {
        match element {
            ElementId::Table(id) => id < self.tables.len(),
            ElementId::Column(id) => id < self.columns.len(),
        }
    }

    pub(crate) fn ensure_element(&self, element: ElementId) -> Result<()> {
        match element {
            ElementId::Table(id) => self.table(id).map(|_| ()),
            ElementId::Column(id) => self.column(id).map(|_| ()),
        }
    }

    /// All elements, tables first, each in creation order.
    pub(crate) fn element_ids(&self) -> Vec<ElementId> {
        (0..self.tables.len())
            .map(ElementId::Table)
            .chain((0..self.columns.len()).map(ElementId::Column))
            .collect()
    }

    pub(crate) fn state(&self, element: ElementId) -> &ElementState {
        match element {
            ElementId::Table(id) => &self.tables[id].state,
            ElementId::Column(id) => &self.columns[id].state,
        }
    }

    pub(crate) fn state_mut(&mut self, element: ElementId) -> &mut ElementState {
        match element {
            ElementId::Table(id) => &mut self.tables[id].state,
            ElementId::Column(id) => &mut self.columns[id].state,
        }
    }

    /// Definition errors currently recorded on `element`.
    pub fn definition_errors(&self, element: ElementId) -> Result<&[DefinitionError]> {
        self.ensure_element(element)?;
        Ok(&self.state(element).definition_errors)
    }

    /// Evaluation errors recorded on `element` by the latest attempt to evaluate it.
    pub fn evaluation_errors(&self, element: ElementId) -> Result<&[EvalError]> {
        self.ensure_element(element)?;
        Ok(&self.state(element).evaluation_errors)
    }

    /// Newest definition change across all elements.
    pub(crate) fn newest_definition_change(&self) -> u64 {
        let tables = self.tables.iter().map(|t| t.state.definition_changed_at);
        let columns = self.columns.iter().map(|c| c.state.definition_changed_at);
        tables.chain(columns).max().unwrap_or(0)
    }

    // ========== Row plumbing used by populations ==========

    /// Appends `count` rows to `table` and sizes its column stores. Does not tick.
    pub(crate) fn append_rows(&mut self, table: TableId, count: usize) -> Range {
        let added = self.tables[table].ids.add(count);
        for i in 0..self.tables[table].columns.len() {
            let column = self.tables[table].columns[i];
            self.columns[column].data.extend_to(added.end);
        }
        added
    }

    /// Removes every row of `table`. Cells stay readable until the next commit.
    pub(crate) fn remove_all_rows(&mut self, table: TableId) -> Range {
        self.tables[table].ids.remove_all()
    }

    /// Makes the current id ranges the new delta baseline and drops removed cells.
    pub(crate) fn commit(&mut self) {
        for table in &mut self.tables {
            table.ids.commit();
            let start = table.ids.id_range().start;
            for &column in &table.columns {
                let data = &mut self.columns[column].data;
                data.trim_to(start);
                data.clear_changed();
            }
        }
    }

    /// Records that every current row has been visible to an evaluation.
    pub(crate) fn settle(&mut self) {
        for table in &mut self.tables {
            table.settled_end = table.ids.id_range().end;
        }
    }
}

impl core::fmt::Debug for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Schema")
            .field("tables", &self.tables)
            .field("columns", &self.columns)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish()
    }
}

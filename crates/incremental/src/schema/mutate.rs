//! Mutation surface: row appends/removals and writes to non-derived columns.

use super::Schema;
use crate::definition::Population;
use alloc::format;
use alloc::vec::Vec;
use colflow_core::{ColumnId, Error, Range, Result, RowId, TableId, Value};

impl Schema {
    /// Appends `count` rows to `table` and returns their ids.
    ///
    /// The new ids are exactly `[old_end, old_end + count)`.
    pub fn add(&mut self, table: TableId, count: usize) -> Result<Range> {
        self.ensure_manual_rows(table)?;
        let added = self.append_rows(table, count);
        let now = self.tick();
        self.tables[table].state.data_changed_at = now;
        Ok(added)
    }

    /// Removes the `count` oldest rows of `table` (fewer if it is shorter) and returns their ids.
    pub fn remove(&mut self, table: TableId, count: usize) -> Result<Range> {
        self.ensure_manual_rows(table)?;
        let removed = self.tables[table].ids.remove(count);
        let now = self.tick();
        self.tables[table].state.data_changed_at = now;
        Ok(removed)
    }

    /// Removes every row of `table` and returns their ids.
    pub fn remove_all(&mut self, table: TableId) -> Result<Range> {
        let len = self.table(table)?.len();
        self.remove(table, len)
    }

    /// Writes `value` at row `id` of a non-derived column.
    pub fn set_value(&mut self, column: ColumnId, id: RowId, value: Value) -> Result<()> {
        self.set_range(column, Range::new(id, id + 1), value)
    }

    /// Writes `value` into every row of `range`, which must lie within the live ids.
    pub fn set_range(&mut self, column: ColumnId, range: Range, value: Value) -> Result<()> {
        let table = self.ensure_writable(column)?;
        self.ensure_live(table, range)?;
        self.columns[column].data.fill(range, &value);
        self.mark_written(column, table, range);
        Ok(())
    }

    /// Writes `value` into every live row of a non-derived column.
    pub fn set_all(&mut self, column: ColumnId, value: Value) -> Result<()> {
        let table = self.ensure_writable(column)?;
        let range = self.tables[table].id_range();
        self.set_range(column, range, value)
    }

    /// Writes consecutive values starting at row `first`.
    pub fn set_values<I>(&mut self, column: ColumnId, first: RowId, values: I) -> Result<()>
    where
        I: IntoIterator<Item = Value>,
    {
        let table = self.ensure_writable(column)?;
        let values: Vec<Value> = values.into_iter().collect();
        let range = Range::new(first, first + values.len() as RowId);
        self.ensure_live(table, range)?;
        for (id, value) in range.ids().zip(values) {
            self.columns[column].data.set(id, value);
        }
        self.mark_written(column, table, range);
        Ok(())
    }

    /// Replaces the value returned for new and reset rows of `column`.
    pub fn set_default(&mut self, column: ColumnId, value: Value) -> Result<()> {
        self.column(column)?;
        self.columns[column].data.set_default(value);
        let now = self.tick();
        let col = &mut self.columns[column];
        if col.is_derived() {
            // derived values depend on the default; force a full recompute
            col.cursor = None;
            col.state.definition_changed_at = now;
        } else {
            col.rewritten_at = now;
            col.state.data_changed_at = now;
        }
        Ok(())
    }

    /// Restores the default value of `column`'s output type.
    pub fn clear_default(&mut self, column: ColumnId) -> Result<()> {
        let output = self.column(column)?.output;
        self.set_default(column, Value::default_for_column(output))
    }

    /// Rows of tables populated by a product/range rule or by incoming projections
    /// are owned by the engine.
    fn ensure_manual_rows(&self, table: TableId) -> Result<()> {
        let t = self.table(table)?;
        if t.population.is_some() {
            return Err(Error::invalid_operation(format!(
                "table {} is populated by a {:?} definition",
                t.name,
                t.population_kind()
            )));
        }
        if !self.incoming_projects(table).is_empty() {
            return Err(Error::invalid_operation(format!(
                "table {} is populated by project columns",
                t.name
            )));
        }
        Ok(())
    }

    /// Returns the column's input table if callers may write its values.
    fn ensure_writable(&self, column: ColumnId) -> Result<TableId> {
        let col = self.column(column)?;
        if col.is_derived() {
            return Err(Error::invalid_operation(format!(
                "column {} is derived ({:?})",
                col.name,
                col.kind()
            )));
        }
        let table = &self.tables[col.input];
        let owned = match &table.population {
            Some(Population::Product(product)) => product.keys.contains(&column),
            Some(Population::Range(range)) => {
                range.value_column == column || range.number_column == Some(column)
            }
            None => false,
        };
        let projected = col.key && !self.incoming_projects(col.input).is_empty();
        if owned || projected {
            return Err(Error::invalid_operation(format!(
                "column {} is written by the population of table {}",
                col.name, table.name
            )));
        }
        Ok(col.input)
    }

    fn ensure_live(&self, table: TableId, range: Range) -> Result<()> {
        let live = self.tables[table].id_range();
        if range.is_empty() {
            return Ok(());
        }
        for row in [range.start, range.end - 1] {
            if !live.contains(row) {
                return Err(Error::RowOutOfRange {
                    table,
                    row,
                    range: live,
                });
            }
        }
        Ok(())
    }

    fn mark_written(&mut self, column: ColumnId, table: TableId, range: Range) {
        let now = self.tick();
        let settled_end = self.tables[table].settled_end;
        let col = &mut self.columns[column];
        col.state.data_changed_at = now;
        if !range.is_empty() && range.start < settled_end {
            col.rewritten_at = now;
        }
    }
}

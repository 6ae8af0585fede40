//! Key lookup into another table.

use super::{pending_rows, range, read_tuple, EvalOutcome, Written};
use crate::definition::{Link, Population};
use crate::schema::{Cursor, Schema};
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, RowId, TableId, Value, UNRESOLVED};
use hashbrown::HashMap;

/// Hash index from key tuples to row ids of one table.
///
/// When several rows share a tuple the lowest id wins. Tuples containing `Null`
/// are never indexed and never found.
#[derive(Debug, Default)]
pub(crate) struct KeyIndex {
    rows: HashMap<Vec<Value>, RowId>,
}

impl KeyIndex {
    /// Indexes every live row of `table` by its `keys` values.
    pub(crate) fn build(schema: &Schema, table: TableId, keys: &[ColumnId]) -> Self {
        let live = schema.tables[table].ids.id_range();
        let mut rows = HashMap::with_capacity(live.length() as usize);
        for id in live.ids() {
            let tuple: Vec<Value> = keys
                .iter()
                .map(|&k| schema.columns[k].data.get(id).clone())
                .collect();
            if !has_null(&tuple) {
                rows.entry(tuple).or_insert(id);
            }
        }
        Self { rows }
    }

    pub(crate) fn find(&self, tuple: &[Value]) -> Option<RowId> {
        if has_null(tuple) {
            return None;
        }
        self.rows.get(tuple).copied()
    }

    pub(crate) fn insert(&mut self, tuple: Vec<Value>, id: RowId) {
        self.rows.entry(tuple).or_insert(id);
    }
}

#[inline]
pub(crate) fn has_null(tuple: &[Value]) -> bool {
    tuple.iter().any(Value::is_null)
}

/// Writes, for every row in scope, the id of the output row whose keys equal the
/// row's tuple, or `-1`. Never modifies the output table.
pub(crate) fn evaluate(schema: &mut Schema, column: ColumnId, link: &Link) -> EvalOutcome {
    let input = schema.columns[column].input;
    let Some(output) = schema.columns[column].output.table() else {
        return Err(EvalError::new("link column does not output a table"));
    };
    let live = schema.tables[input].ids.id_range();
    let reads = link.keys.iter().chain(link.source_paths().into_iter().flatten());
    let (scope, written) = match pending_rows(schema, column, reads, &[output]) {
        Some(rows) => (rows, Written::Appended),
        None => (live, Written::Rewritten),
    };

    let intervals = match &schema.tables[output].population {
        Some(Population::Range(range)) => Some(range.clone()),
        _ => None,
    };
    let index = match intervals {
        Some(_) => KeyIndex::default(),
        None => KeyIndex::build(schema, output, &link.keys),
    };

    let mut scratch = Vec::new();
    for id in scope.ids() {
        let tuple = read_tuple(schema, &link.values, id, &mut scratch)?;
        let target = match &intervals {
            Some(range) => tuple
                .first()
                .and_then(|probe| range::find(schema, output, range, probe)),
            None => index.find(&tuple),
        };
        schema.columns[column]
            .data
            .set(id, Value::Int64(target.unwrap_or(UNRESOLVED)));
    }

    schema.columns[column].cursor = Some(Cursor::rows(live));
    Ok(written)
}

//! Row-wise calculation.

use super::{pending_rows, EvalOutcome, Written};
use crate::definition::Calculate;
use crate::schema::{Cursor, Schema};
use alloc::vec::Vec;
use colflow_core::ColumnId;

/// Writes `f(params)` for every row in scope; without an evaluator, resets the
/// rows to the column default.
pub(crate) fn evaluate(schema: &mut Schema, column: ColumnId, calc: &Calculate) -> EvalOutcome {
    let table = schema.columns[column].input;
    let live = schema.tables[table].ids.id_range();
    let reads = calc.params.iter().flatten();
    let (scope, written) = match pending_rows(schema, column, reads, &[]) {
        Some(rows) => (rows, Written::Appended),
        None => (live, Written::Rewritten),
    };

    match &calc.evaluator {
        None => schema.columns[column].data.reset(scope),
        Some(f) => {
            let mut params = Vec::with_capacity(calc.params.len());
            for id in scope.ids() {
                schema.read_params(&calc.params, id, &mut params);
                let value = f(&params)?;
                schema.columns[column].data.set(id, value);
            }
        }
    }

    schema.columns[column].cursor = Some(Cursor::rows(live));
    Ok(written)
}

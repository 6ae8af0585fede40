//! Cartesian product population.

use super::{EvalOutcome, Written};
use crate::definition::{Predicate, Product};
use crate::schema::Schema;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, Range, TableId, Value};

/// Evaluates `predicate` on a candidate tuple whose values belong to `keys`.
///
/// A parameter path starts with a key column, whose value is taken from the
/// tuple; any remaining columns are read from that key's domain row.
pub(crate) fn accepts(
    schema: &Schema,
    keys: &[ColumnId],
    tuple: &[Value],
    predicate: &Predicate,
) -> Result<bool, EvalError> {
    let params: Vec<Value> = predicate
        .params
        .iter()
        .map(|path| {
            let Some((first, rest)) = path.split_first() else {
                return Value::Null;
            };
            let Some(value) = keys.iter().position(|k| k == first).map(|i| &tuple[i]) else {
                return Value::Null;
            };
            if rest.is_empty() {
                return value.clone();
            }
            match value.as_row_id() {
                Some(row) => schema.read_path(rest, row),
                None => Value::Null,
            }
        })
        .collect();

    match (predicate.evaluator)(&params)? {
        Value::Boolean(accepted) => Ok(accepted),
        Value::Null => Ok(false),
        other => Err(EvalError::new(format!(
            "product predicate returned {:?} instead of a boolean",
            other
        ))),
    }
}

/// Rebuilds `table` as every combination of one live row per key domain, the
/// last key varying fastest.
pub(crate) fn populate(schema: &mut Schema, table: TableId, product: &Product) -> EvalOutcome {
    schema.remove_all_rows(table);

    let domains: Vec<Range> = product
        .keys
        .iter()
        .map(|&key| match schema.columns[key].output.table() {
            Some(domain) => schema.tables[domain].ids.id_range(),
            None => Range::default(),
        })
        .collect();
    if domains.is_empty() || domains.iter().any(Range::is_empty) {
        return Ok(Written::Rewritten);
    }

    let mut accepted: Vec<Vec<Value>> = Vec::new();
    let mut offsets = vec![0i64; domains.len()];
    'odometer: loop {
        let tuple: Vec<Value> = domains
            .iter()
            .zip(&offsets)
            .map(|(domain, offset)| Value::Int64(domain.start + offset))
            .collect();
        let keep = match &product.predicate {
            Some(predicate) => accepts(schema, &product.keys, &tuple, predicate)?,
            None => true,
        };
        if keep {
            accepted.push(tuple);
        }

        let mut digit = offsets.len();
        loop {
            if digit == 0 {
                break 'odometer;
            }
            digit -= 1;
            offsets[digit] += 1;
            if offsets[digit] < domains[digit].length() {
                break;
            }
            offsets[digit] = 0;
        }
    }

    let added = schema.append_rows(table, accepted.len());
    for (id, tuple) in added.ids().zip(accepted) {
        for (&key, value) in product.keys.iter().zip(tuple) {
            schema.columns[key].data.set(id, value);
        }
    }
    Ok(Written::Rewritten)
}

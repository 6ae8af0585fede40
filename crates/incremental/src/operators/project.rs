//! Key lookup with append.
//!
//! A project column is evaluated as part of its target table: the table resets
//! (unless it is a range table) and each incoming projection then scans its
//! whole input, linking to existing rows and appending the missing ones.

use super::link::{has_null, KeyIndex};
use super::{product, range, read_tuple};
use crate::definition::{Link, Population};
use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, RowId, TableId, Value, UNRESOLVED};

/// Runs the projection of `column` into `target`, whose population (already
/// taken out of the table) is `population`.
pub(crate) fn evaluate(
    schema: &mut Schema,
    column: ColumnId,
    target: TableId,
    link: &Link,
    population: Option<&Population>,
) -> Result<(), EvalError> {
    let input = schema.columns[column].input;
    let live = schema.tables[input].ids.id_range();
    let mut scratch = Vec::new();

    if let Some(Population::Range(intervals)) = population {
        for id in live.ids() {
            let tuple = read_tuple(schema, &link.values, id, &mut scratch)?;
            let found = match tuple.first() {
                Some(probe) => range::find_or_extend(schema, target, intervals, probe),
                None => None,
            };
            set_link(schema, column, id, found);
        }
        return Ok(());
    }

    let predicate = match population {
        Some(Population::Product(p)) => p.predicate.as_ref(),
        _ => None,
    };
    let mut index = KeyIndex::build(schema, target, &link.keys);
    for id in live.ids() {
        let tuple = read_tuple(schema, &link.values, id, &mut scratch)?;
        if has_null(&tuple) {
            set_link(schema, column, id, None);
            continue;
        }
        let found = match index.find(&tuple) {
            Some(row) => Some(row),
            None => {
                let allowed = match predicate {
                    Some(predicate) => product::accepts(schema, &link.keys, &tuple, predicate)?,
                    None => true,
                };
                if allowed {
                    let row = schema.append_rows(target, 1).start;
                    for (&key, value) in link.keys.iter().zip(&tuple) {
                        schema.columns[key].data.set(row, value.clone());
                    }
                    index.insert(tuple, row);
                    Some(row)
                } else {
                    None
                }
            }
        };
        set_link(schema, column, id, found);
    }
    Ok(())
}

fn set_link(schema: &mut Schema, column: ColumnId, id: RowId, target: Option<RowId>) {
    schema.columns[column]
        .data
        .set(id, Value::Int64(target.unwrap_or(UNRESOLVED)));
}

//! Sliding windows over the column's own table.
//!
//! Distances must be non-decreasing in id order; both window bounds then only
//! move forward, so a full pass is linear in rows plus window memberships.

use super::{EvalOutcome, Written};
use crate::definition::{Roll, RollDistance};
use crate::schema::Schema;
use alloc::format;
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, Value};

/// Each row's fold starts from the column default, not its previous value,
/// so repeated passes give the same result.
pub(crate) fn evaluate(schema: &mut Schema, column: ColumnId, roll: &Roll) -> EvalOutcome {
    let table = schema.columns[column].input;
    let live = schema.tables[table].ids.id_range();

    let mut distances = Vec::with_capacity(live.length() as usize);
    let mut params = Vec::with_capacity(live.length() as usize);
    for id in live.ids() {
        let d = match &roll.distance {
            RollDistance::Ids => id as f64,
            RollDistance::Path(path) => {
                let value = schema.read_path(path, id);
                value.to_f64().ok_or_else(|| {
                    EvalError::new(format!("row {} has non-numeric distance {:?}", id, value))
                })?
            }
        };
        distances.push(d);
        let mut row = Vec::with_capacity(roll.params.len());
        schema.read_params(&roll.params, id, &mut row);
        params.push(row);
    }

    schema.columns[column].data.reset(live);

    let n = distances.len();
    let (mut min, mut max) = (0, 0);
    for i in 0..n {
        while min < i && distances[i] - distances[min] >= roll.size_past {
            min += 1;
        }
        while max < n && distances[max] - distances[i] <= roll.size_future {
            max += 1;
        }
        let id = live.start + i as i64;
        let mut agg: Value = schema.columns[column].data.get(id).clone();
        for j in min..max {
            agg = (roll.roll)(&agg, distances[i] - distances[j], &params[j])?;
        }
        schema.columns[column].data.set(id, agg);
    }
    Ok(Written::Rewritten)
}

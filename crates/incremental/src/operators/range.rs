//! Interval population.
//!
//! Row `k` of a range table covers `[origin + k * period, origin + (k + 1) * period)`.
//! Rows are only ever appended in increasing `k`, so the value column is sorted
//! and can be binary searched.

use super::{EvalOutcome, Written};
use crate::definition::RangePopulation;
use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::{RowId, TableId, Value};

/// Numeric view of an interval grid.
#[derive(Clone, Copy, Debug)]
struct Grid {
    origin: f64,
    period: f64,
}

impl Grid {
    fn of(range: &RangePopulation) -> Option<Self> {
        Some(Self {
            origin: range.origin.to_f64()?,
            period: range.period.to_f64()?,
        })
    }

    /// Number of the interval covering `x`, or `None` if `x` precedes the origin.
    fn number_of(&self, x: f64) -> Option<u64> {
        let k = libm::floor((x - self.origin) / self.period);
        (k >= 0.0).then_some(k as u64)
    }

    /// Number of the interval starting at `start`, robust to rounding of the start value.
    fn number_at(&self, start: f64) -> i64 {
        libm::round((start - self.origin) / self.period) as i64
    }
}

/// Start value of interval `k`, typed like the origin, or `None` if it overflows.
fn interval_start(range: &RangePopulation, k: u64) -> Option<Value> {
    let offset = |o: i64, p: i64| {
        i64::try_from(k)
            .ok()
            .and_then(|k| k.checked_mul(p))
            .and_then(|d| o.checked_add(d))
    };
    match (&range.origin, &range.period) {
        (Value::Int64(o), Value::Int64(p)) => offset(*o, *p).map(Value::Int64),
        (Value::DateTime(o), Value::Duration(p)) => offset(*o, *p).map(Value::DateTime),
        (origin, period) => {
            let o = origin.to_f64()?;
            let p = period.to_f64()?;
            Some(Value::Float64(o + k as f64 * p))
        }
    }
}

fn start_of(schema: &Schema, range: &RangePopulation, id: RowId) -> Option<f64> {
    schema.columns[range.value_column].data.get(id).to_f64()
}

/// Number of the next interval to append.
fn next_number(schema: &Schema, table: TableId, range: &RangePopulation, grid: Grid) -> u64 {
    let live = schema.tables[table].ids.id_range();
    if live.is_empty() {
        return 0;
    }
    match start_of(schema, range, live.end - 1) {
        Some(start) => (grid.number_at(start) + 1).max(0) as u64,
        None => 0,
    }
}

/// Appends intervals `from..to` and returns the id of the last one. Stops at
/// the first interval whose start does not fit the origin's type, in which
/// case interval `to - 1` does not exist and `None` is returned.
fn append_intervals(
    schema: &mut Schema,
    table: TableId,
    range: &RangePopulation,
    from: u64,
    to: u64,
) -> Option<RowId> {
    let starts: Vec<Value> = (from..to)
        .map_while(|k| interval_start(range, k))
        .collect();
    if starts.is_empty() {
        return None;
    }
    let complete = starts.len() as u64 == to - from;
    let added = schema.append_rows(table, starts.len());
    for ((id, k), start) in added.ids().zip(from..).zip(starts) {
        schema.columns[range.value_column].data.set(id, start);
        if let Some(number) = range.number_column {
            schema.columns[number].data.set(id, Value::Int64(k as i64));
        }
    }
    complete.then_some(added.end - 1)
}

/// Populates a range table. Existing intervals are kept unless the definition
/// changed; bulk mode then tops the table up to `count` intervals.
pub(crate) fn populate(schema: &mut Schema, table: TableId, range: &RangePopulation) -> EvalOutcome {
    let state = &schema.tables[table].state;
    if state.definition_changed_at > state.data_changed_at {
        schema.remove_all_rows(table);
    }
    if !range.on_demand {
        if let Some(grid) = Grid::of(range) {
            let next = next_number(schema, table, range, grid);
            append_intervals(schema, table, range, next, range.count);
        }
    }
    Ok(Written::Rewritten)
}

/// Binary-searches the interval covering `probe`.
pub(crate) fn find(
    schema: &Schema,
    table: TableId,
    range: &RangePopulation,
    probe: &Value,
) -> Option<RowId> {
    let grid = Grid::of(range)?;
    let x = probe.to_f64()?;
    let live = schema.tables[table].ids.id_range();

    // first id whose start exceeds x
    let (mut lo, mut hi) = (live.start, live.end);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match start_of(schema, range, mid) {
            Some(start) if start <= x => lo = mid + 1,
            _ => hi = mid,
        }
    }
    if lo == live.start {
        return None;
    }
    let candidate = lo - 1;
    let start = start_of(schema, range, candidate)?;
    (x < start + grid.period).then_some(candidate)
}

/// Like [`find`], but appends the missing intervals between the last existing
/// one and the one covering `probe`. Probes that would need an interval before
/// the existing ones, or beyond `count`, are not found.
pub(crate) fn find_or_extend(
    schema: &mut Schema,
    table: TableId,
    range: &RangePopulation,
    probe: &Value,
) -> Option<RowId> {
    if let Some(id) = find(schema, table, range, probe) {
        return Some(id);
    }
    let grid = Grid::of(range)?;
    let k = grid.number_of(probe.to_f64()?)?;
    if k >= range.count {
        return None;
    }
    let next = next_number(schema, table, range, grid);
    if k < next {
        return None;
    }
    append_intervals(schema, table, range, next, k + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Population;
    use alloc::vec;
    use colflow_core::{ColumnType, DataType};

    fn range_table(on_demand: bool) -> (Schema, TableId, RangePopulation) {
        let mut schema = Schema::new();
        let r = schema.create_table("r");
        let start = schema
            .create_column(r, "start", ColumnType::Primitive(DataType::Float64))
            .unwrap();
        let number = schema
            .create_column(r, "k", ColumnType::Primitive(DataType::Int64))
            .unwrap();
        let mut range = RangePopulation::new(start, Value::Float64(10.0), Value::Float64(20.0), 5)
            .with_number_column(number);
        range.on_demand = on_demand;
        schema
            .define_table(r, Population::Range(range.clone()))
            .unwrap();
        (schema, r, range)
    }

    #[test]
    fn test_bulk_population() {
        let (mut schema, r, range) = range_table(false);
        schema.evaluate();
        assert_eq!(
            schema.values(range.value_column).unwrap(),
            vec![
                Value::Float64(10.0),
                Value::Float64(30.0),
                Value::Float64(50.0),
                Value::Float64(70.0),
                Value::Float64(90.0),
            ]
        );
        assert_eq!(schema.value(range.number_column.unwrap(), 4), Ok(&Value::Int64(4)));
        assert_eq!(find(&schema, r, &range, &Value::Float64(95.0)), Some(4));
        assert_eq!(find(&schema, r, &range, &Value::Float64(10.0)), Some(0));
        assert_eq!(find(&schema, r, &range, &Value::Float64(29.999)), Some(0));
        assert_eq!(find(&schema, r, &range, &Value::Float64(110.0)), None);
        assert_eq!(find(&schema, r, &range, &Value::Float64(9.0)), None);

        // a second pass does not duplicate intervals
        schema.evaluate();
        assert_eq!(schema.table(r).unwrap().len(), 5);
    }

    #[test]
    fn test_on_demand_extension() {
        let (mut schema, r, range) = range_table(true);
        schema.evaluate();
        assert!(schema.table(r).unwrap().is_empty());

        assert_eq!(find_or_extend(&mut schema, r, &range, &Value::Float64(55.0)), Some(2));
        assert_eq!(schema.table(r).unwrap().len(), 3);
        assert_eq!(find_or_extend(&mut schema, r, &range, &Value::Float64(35.0)), Some(1));
        assert_eq!(find_or_extend(&mut schema, r, &range, &Value::Int64(95)), Some(4));
        assert_eq!(schema.table(r).unwrap().len(), 5);
    }

    #[test]
    fn test_extension_stops_at_count() {
        let (mut schema, r, range) = range_table(true);
        assert_eq!(find_or_extend(&mut schema, r, &range, &Value::Float64(110.0)), None);
        assert_eq!(find_or_extend(&mut schema, r, &range, &Value::Float64(5.0)), None);
        assert!(schema.table(r).unwrap().is_empty());
    }

    #[test]
    fn test_datetime_intervals() {
        let range = RangePopulation::new(0, Value::DateTime(1_000), Value::Duration(500), 3);
        assert_eq!(interval_start(&range, 2), Some(Value::DateTime(2_000)));
        let grid = Grid::of(&range).unwrap();
        assert_eq!(grid.number_of(1_750.0), Some(1));
        assert_eq!(grid.number_of(999.0), None);
    }

    #[test]
    fn test_population_stops_before_overflow() {
        let mut schema = Schema::new();
        let r = schema.create_table("r");
        let start = schema
            .create_column(r, "start", ColumnType::Primitive(DataType::Int64))
            .unwrap();
        let range = RangePopulation::new(start, Value::Int64(i64::MAX - 25), Value::Int64(10), 5);
        schema.define_table(r, Population::Range(range)).unwrap();
        assert!(schema.evaluate().is_success());
        assert_eq!(
            schema.values(start).unwrap(),
            vec![
                Value::Int64(i64::MAX - 25),
                Value::Int64(i64::MAX - 15),
                Value::Int64(i64::MAX - 5),
            ]
        );

        let late = RangePopulation::new(0, Value::DateTime(0), Value::Duration(i64::MAX), 3);
        assert_eq!(interval_start(&late, 1), Some(Value::DateTime(i64::MAX)));
        assert_eq!(interval_start(&late, 2), None);
    }
}

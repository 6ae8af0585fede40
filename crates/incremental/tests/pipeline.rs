//! End-to-end tests chaining several computation kinds.
//!
//! Sales facts are projected onto a region table and linked into a weekly
//! range table; both receive accumulated totals, and weeks get a rolling sum.

use colflow_core::function::{evaluator, roll_fn};
use colflow_core::{ColumnId, ColumnType, DataType, ElementId, TableId, Value};
use colflow_incremental::aggregate::{count_adder, count_remover, sum_adder, sum_remover};
use colflow_incremental::{
    Accumulate, Calculate, ColumnDefinition, EngineConfig, Link, Population, RangePopulation,
    Roll, Schema,
};

struct Pipeline {
    schema: Schema,
    sales: TableId,
    regions: TableId,
    weeks: TableId,
    region: ColumnId,
    amount: ColumnId,
    day: ColumnId,
    name: ColumnId,
    total: ColumnId,
    count: ColumnId,
    average: ColumnId,
    revenue: ColumnId,
    rolling: ColumnId,
}

fn build(config: EngineConfig) -> Pipeline {
    let mut schema = Schema::with_config(config);
    let sales = schema.create_table("sales");
    let regions = schema.create_table("regions");
    let weeks = schema.create_table("weeks");

    let string = ColumnType::Primitive(DataType::String);
    let int = ColumnType::Primitive(DataType::Int64);
    let float = ColumnType::Primitive(DataType::Float64);

    let region = schema.create_column(sales, "region", string).unwrap();
    let amount = schema.create_column(sales, "amount", float).unwrap();
    let day = schema.create_column(sales, "day", int).unwrap();
    let name = schema.create_key_column(regions, "name", string).unwrap();
    let start = schema.create_column(weeks, "start", int).unwrap();

    schema
        .define_table(
            weeks,
            Population::Range(RangePopulation::new(start, Value::Int64(0), Value::Int64(7), 10)),
        )
        .unwrap();

    let region_id = schema
        .create_column(sales, "region_id", ColumnType::Table(regions))
        .unwrap();
    schema
        .define_column(
            region_id,
            ColumnDefinition::Project(Link::from_paths(vec![name], vec![vec![region]])),
        )
        .unwrap();

    let week = schema
        .create_column(sales, "week", ColumnType::Table(weeks))
        .unwrap();
    schema
        .define_column(
            week,
            ColumnDefinition::Link(Link::from_paths(vec![start], vec![vec![day]])),
        )
        .unwrap();

    let total = schema.create_column(regions, "total", float).unwrap();
    schema
        .define_column(
            total,
            ColumnDefinition::Accumulate(
                Accumulate::new(vec![region_id], sum_adder())
                    .with_remover(sum_remover())
                    .with_params(vec![vec![amount]]),
            ),
        )
        .unwrap();

    let count = schema.create_column(regions, "count", int).unwrap();
    schema
        .define_column(
            count,
            ColumnDefinition::Accumulate(
                Accumulate::new(vec![region_id], count_adder()).with_remover(count_remover()),
            ),
        )
        .unwrap();

    let average = schema.create_column(regions, "average", float).unwrap();
    let mean = evaluator(|p| match (p[0].to_f64(), p[1].as_i64()) {
        (Some(sum), Some(n)) if n > 0 => Ok(Value::Float64(sum / n as f64)),
        _ => Ok(Value::Null),
    });
    schema
        .define_column(
            average,
            ColumnDefinition::Calculate(Calculate::new(mean, vec![vec![total], vec![count]])),
        )
        .unwrap();

    let revenue = schema.create_column(weeks, "revenue", float).unwrap();
    schema
        .define_column(
            revenue,
            ColumnDefinition::Accumulate(
                Accumulate::new(vec![week], sum_adder())
                    .with_remover(sum_remover())
                    .with_params(vec![vec![amount]]),
            ),
        )
        .unwrap();

    let rolling = schema.create_column(weeks, "rolling", float).unwrap();
    let plus = roll_fn(|agg, _, p| {
        Ok(Value::Float64(agg.to_f64().unwrap_or(0.0) + p[0].to_f64().unwrap_or(0.0)))
    });
    schema
        .define_column(
            rolling,
            ColumnDefinition::Roll(Roll::new(2.0, 0.0, plus).with_params(vec![vec![revenue]])),
        )
        .unwrap();

    Pipeline {
        schema,
        sales,
        regions,
        weeks,
        region,
        amount,
        day,
        name,
        total,
        count,
        average,
        revenue,
        rolling,
    }
}

fn sell(p: &mut Pipeline, rows: &[(&str, f64, i64)]) {
    let added = p.schema.add(p.sales, rows.len()).unwrap();
    p.schema
        .set_values(p.region, added.start, rows.iter().map(|r| Value::from(r.0)))
        .unwrap();
    p.schema
        .set_values(p.amount, added.start, rows.iter().map(|r| Value::Float64(r.1)))
        .unwrap();
    p.schema
        .set_values(p.day, added.start, rows.iter().map(|r| Value::Int64(r.2)))
        .unwrap();
}

/// `(region name, value)` pairs sorted by name.
fn by_region(p: &Pipeline, column: ColumnId) -> Vec<(String, Value)> {
    let names = p.schema.values(p.name).unwrap();
    let values = p.schema.values(column).unwrap();
    let mut pairs: Vec<(String, Value)> = names
        .into_iter()
        .map(|n| n.as_str().unwrap_or_default().to_string())
        .zip(values)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

fn floats(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::Float64).collect()
}

fn first_weeks(p: &Pipeline, column: ColumnId, n: usize) -> Vec<Value> {
    p.schema.values(column).unwrap().into_iter().take(n).collect()
}

#[test]
fn test_pipeline_first_pass() {
    let mut p = build(EngineConfig::default());
    sell(
        &mut p,
        &[("north", 10.0, 1), ("south", 5.0, 3), ("north", 2.5, 8), ("east", 1.0, 15)],
    );
    let report = p.schema.evaluate();
    assert!(report.is_success(), "{:?}", report.failed);

    assert_eq!(p.schema.table(p.regions).unwrap().len(), 3);
    assert_eq!(
        by_region(&p, p.total),
        vec![
            ("east".to_string(), Value::Float64(1.0)),
            ("north".to_string(), Value::Float64(12.5)),
            ("south".to_string(), Value::Float64(5.0)),
        ]
    );
    assert_eq!(
        by_region(&p, p.count),
        vec![
            ("east".to_string(), Value::Int64(1)),
            ("north".to_string(), Value::Int64(2)),
            ("south".to_string(), Value::Int64(1)),
        ]
    );
    assert_eq!(
        by_region(&p, p.average)[1],
        ("north".to_string(), Value::Float64(6.25))
    );

    assert_eq!(p.schema.table(p.weeks).unwrap().len(), 10);
    assert_eq!(first_weeks(&p, p.revenue, 4), floats(&[15.0, 2.5, 1.0, 0.0]));
    assert_eq!(first_weeks(&p, p.rolling, 4), floats(&[15.0, 17.5, 3.5, 1.0]));
}

#[test]
fn test_pipeline_follows_appends_and_removals() {
    let mut p = build(EngineConfig::default());
    sell(
        &mut p,
        &[("north", 10.0, 1), ("south", 5.0, 3), ("north", 2.5, 8), ("east", 1.0, 15)],
    );
    p.schema.evaluate();

    p.schema.remove(p.sales, 2).unwrap();
    sell(&mut p, &[("south", 4.0, 9)]);
    let report = p.schema.evaluate();
    assert!(report.is_success());
    // the range table keeps its intervals
    assert!(report.skipped.contains(&ElementId::Table(p.weeks)));

    assert_eq!(
        by_region(&p, p.total),
        vec![
            ("east".to_string(), Value::Float64(1.0)),
            ("north".to_string(), Value::Float64(2.5)),
            ("south".to_string(), Value::Float64(4.0)),
        ]
    );
    assert_eq!(first_weeks(&p, p.revenue, 4), floats(&[0.0, 6.5, 1.0, 0.0]));
    assert_eq!(first_weeks(&p, p.rolling, 4), floats(&[0.0, 6.5, 7.5, 1.0]));
}

#[test]
fn test_incremental_matches_full_rescan() {
    let mut fast = build(EngineConfig::default());
    let mut slow = build(EngineConfig::full_rescan());
    let batches: [&[(&str, f64, i64)]; 3] = [
        &[("a", 1.0, 0), ("b", 2.0, 6), ("a", 3.0, 7)],
        &[("c", 4.0, 13), ("b", 0.5, 14)],
        &[("a", 8.0, 60), ("a", 1.5, 69), ("z", 2.0, 70)],
    ];
    for (i, batch) in batches.iter().enumerate() {
        for p in [&mut fast, &mut slow] {
            if i == 2 {
                p.schema.remove(p.sales, 2).unwrap();
            }
            sell(p, batch);
            p.schema.evaluate();
        }
        for column in [fast.total, fast.count, fast.average, fast.revenue, fast.rolling] {
            assert_eq!(fast.schema.values(column), slow.schema.values(column));
        }
    }
    // day 70 lies beyond the last interval
    let week = fast.schema.column_id(fast.sales, "week").unwrap();
    let last = fast.schema.table(fast.sales).unwrap().id_range().end - 1;
    assert_eq!(fast.schema.value(week, last), Ok(&Value::Int64(-1)));
}

#[test]
fn test_derived_rows_reject_manual_edits() {
    let mut p = build(EngineConfig::default());
    assert!(p.schema.add(p.weeks, 1).is_err());
    assert!(p.schema.add(p.regions, 1).is_err());
    assert!(p.schema.set_value(p.total, 0, Value::Float64(1.0)).is_err());
    sell(&mut p, &[("north", 1.0, 0)]);
    p.schema.evaluate();
    assert!(p.schema.set_value(p.name, 0, Value::from("west")).is_err());
}

//! Integration tests for the definition surface: cycle rejection, definition
//! errors and how errors propagate through evaluation.

use colflow_core::function::evaluator;
use colflow_core::{
    ColumnType, DataType, DefinitionError, ElementId, Error, EvalError, Evaluator, Value,
};
use colflow_incremental::aggregate::count_adder;
use colflow_incremental::{
    Accumulate, Calculate, ColumnDefinition, ColumnKind, Population, PopulationKind, Predicate,
    Product, Schema,
};

fn copy() -> Evaluator {
    evaluator(|p| Ok(p[0].clone()))
}

fn int() -> ColumnType {
    ColumnType::Primitive(DataType::Int64)
}

#[test]
fn test_column_cycle_is_rejected() {
    let mut schema = Schema::new();
    let t = schema.create_table("t");
    let a = schema.create_column(t, "a", int()).unwrap();
    let b = schema.create_column(t, "b", int()).unwrap();
    let c = schema.create_column(t, "c", int()).unwrap();

    schema
        .define_column(a, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![b]])))
        .unwrap();
    schema
        .define_column(b, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![c]])))
        .unwrap();
    let rejected =
        schema.define_column(c, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![a]])));
    assert!(matches!(
        rejected,
        Err(Error::Definition(DefinitionError::CyclicDependency { .. }))
    ));

    let column = schema.column(c).unwrap();
    assert_eq!(column.kind(), ColumnKind::Noop);
    assert_eq!(column.definition_errors().len(), 1);

    // a valid definition replaces the error
    schema
        .define_column(c, ColumnDefinition::Calculate(Calculate::reset()))
        .unwrap();
    assert!(schema.column(c).unwrap().definition_errors().is_empty());
    assert!(schema.evaluate().is_success());
}

#[test]
fn test_definition_error_blocks_downstream() {
    let mut schema = Schema::new();
    let t = schema.create_table("t");
    let a = schema.create_column(t, "a", int()).unwrap();
    let b = schema.create_column(t, "b", int()).unwrap();
    let c = schema.create_column(t, "c", int()).unwrap();
    schema
        .define_column(b, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![a]])))
        .unwrap();
    schema
        .define_column(c, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![b]])))
        .unwrap();
    schema.add(t, 1).unwrap();
    schema.set_value(a, 0, Value::Int64(7)).unwrap();
    schema.evaluate();
    assert_eq!(schema.value(c, 0), Ok(&Value::Int64(7)));

    // a path that does not start on the column's table
    let u = schema.create_table("u");
    let other = schema.create_column(u, "x", int()).unwrap();
    assert!(schema
        .define_column(b, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![other]])))
        .is_err());

    schema.set_value(a, 0, Value::Int64(8)).unwrap();
    let report = schema.evaluate();
    assert!(report.skipped.contains(&ElementId::Column(b)));
    assert!(report.skipped.contains(&ElementId::Column(c)));
    assert_eq!(schema.value(c, 0), Ok(&Value::Int64(7)));
    assert!(!schema.topology().contains(ElementId::Column(c)));
}

#[test]
fn test_product_predicate_cycle_is_rejected() {
    let mut schema = Schema::new();
    let a = schema.create_table("a");
    let p = schema.create_table("p");
    let key = schema.create_key_column(p, "a", ColumnType::Table(a)).unwrap();
    let uses = schema.create_column(a, "uses", int()).unwrap();
    schema
        .define_column(
            uses,
            ColumnDefinition::Accumulate(Accumulate::new(vec![key], count_adder())),
        )
        .unwrap();

    // the product would read an aggregate over its own rows
    let predicate = Predicate::new(
        evaluator(|p| Ok(Value::Boolean(p[0].as_i64() == Some(0)))),
        vec![vec![key, uses]],
    );
    let rejected = schema.define_table(
        p,
        Population::Product(Product::new(vec![key]).with_predicate(predicate)),
    );
    assert!(matches!(
        rejected,
        Err(Error::Definition(DefinitionError::CyclicDependency { .. }))
    ));
    let table = schema.table(p).unwrap();
    assert_eq!(table.population_kind(), PopulationKind::None);
    assert_eq!(table.definition_errors().len(), 1);

    schema
        .define_table(p, Population::Product(Product::new(vec![key])))
        .unwrap();
    schema.add(a, 3).unwrap();
    assert!(schema.evaluate().is_success());
    assert_eq!(
        schema.values(uses).unwrap(),
        vec![Value::Int64(1), Value::Int64(1), Value::Int64(1)]
    );
}

#[test]
fn test_evaluation_error_is_retried() {
    let mut schema = Schema::new();
    let t = schema.create_table("t");
    let a = schema.create_column(t, "a", int()).unwrap();
    let b = schema.create_column(t, "b", int()).unwrap();
    let strict = evaluator(|p| match p[0].as_i64() {
        Some(v) if v != 0 => Ok(Value::Int64(100 / v)),
        _ => Err(EvalError::new("division by zero")),
    });
    schema
        .define_column(b, ColumnDefinition::Calculate(Calculate::new(strict, vec![vec![a]])))
        .unwrap();
    schema.add(t, 2).unwrap();
    schema.set_values(a, 0, [Value::Int64(4), Value::Int64(0)]).unwrap();

    let report = schema.evaluate();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1.message(), "division by zero");
    assert_eq!(
        schema.evaluation_errors(ElementId::Column(b)).unwrap().len(),
        1
    );

    // nothing changed: the column is still dirty and fails again
    let report = schema.evaluate();
    assert_eq!(report.failed.len(), 1);

    schema.set_value(a, 1, Value::Int64(5)).unwrap();
    let report = schema.evaluate();
    assert!(report.is_success());
    assert_eq!(
        schema.values(b).unwrap(),
        vec![Value::Int64(25), Value::Int64(20)]
    );
    assert!(schema.evaluation_errors(ElementId::Column(b)).unwrap().is_empty());
}

#[test]
fn test_clearing_definition_makes_column_manual() {
    let mut schema = Schema::new();
    let t = schema.create_table("t");
    let a = schema.create_column(t, "a", int()).unwrap();
    let b = schema.create_column(t, "b", int()).unwrap();
    schema
        .define_column(b, ColumnDefinition::Calculate(Calculate::new(copy(), vec![vec![a]])))
        .unwrap();
    schema.add(t, 1).unwrap();
    assert!(schema.set_value(b, 0, Value::Int64(1)).is_err());

    schema.clear_column_definition(b).unwrap();
    assert!(!schema.column(b).unwrap().is_derived());
    schema.set_value(b, 0, Value::Int64(1)).unwrap();
    schema.set_value(a, 0, Value::Int64(9)).unwrap();
    schema.evaluate();
    assert_eq!(schema.value(b, 0), Ok(&Value::Int64(1)));
    assert_eq!(
        schema.dependencies(ElementId::Column(b)),
        Ok(vec![ElementId::Table(t)])
    );
}

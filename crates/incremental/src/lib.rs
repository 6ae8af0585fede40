//! Colflow Incremental - dependency-driven evaluation of derived tables and columns.
//!
//! A [`Schema`] holds tables (id spaces) and columns (value functions over a
//! table's ids). Columns and tables may carry a definition; the engine derives
//! their dependencies from it, rejects cycles when it is attached, and brings
//! stale elements up to date in topological order on [`Schema::evaluate`].
//!
//! # Computation kinds
//!
//! - Columns: calculate, link, project, accumulate, roll
//! - Tables: product, range
//!
//! Calculate, link and accumulate columns only process the rows appended (and,
//! for accumulate, removed) since their previous evaluation, unless something
//! they already read was rewritten.
//!
//! # Example
//!
//! ```rust
//! use colflow_core::{ColumnType, DataType, Value};
//! use colflow_core::function::evaluator;
//! use colflow_incremental::{Calculate, ColumnDefinition, Schema};
//!
//! let mut schema = Schema::new();
//! let orders = schema.create_table("orders");
//! let qty = schema
//!     .create_column(orders, "qty", ColumnType::Primitive(DataType::Int64))
//!     .unwrap();
//! let double = schema
//!     .create_column(orders, "double", ColumnType::Primitive(DataType::Int64))
//!     .unwrap();
//! let f = evaluator(|p| Ok(Value::Int64(p[0].as_i64().unwrap_or(0) * 2)));
//! schema
//!     .define_column(double, ColumnDefinition::Calculate(Calculate::new(f, vec![vec![qty]])))
//!     .unwrap();
//!
//! schema.add(orders, 2).unwrap();
//! schema.set_values(qty, 0, [Value::Int64(3), Value::Int64(4)]).unwrap();
//! let report = schema.evaluate();
//! assert!(report.is_success());
//! assert_eq!(schema.values(double).unwrap(), vec![Value::Int64(6), Value::Int64(8)]);
//! ```

#![no_std]

extern crate alloc;

mod config;
pub mod dataflow;
pub mod definition;
mod evaluate;
pub mod operators;
mod path;
mod schema;

pub use config::EngineConfig;
pub use dataflow::Topology;
pub use definition::{
    Accumulate, Calculate, ColumnDefinition, ColumnKind, ColumnPath, KeySource, Link, Population,
    PopulationKind, Predicate, Product, RangePopulation, Roll, RollDistance,
};
pub use evaluate::EvaluationReport;
pub use operators::aggregate;
pub use schema::{Column, Schema, Table};

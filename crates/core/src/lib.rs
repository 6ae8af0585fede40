//! Colflow Core - Core types for the Colflow incremental column engine.
//!
//! This crate provides the foundational types shared by the storage layer and
//! the evaluation engine:
//!
//! - `TableId`, `ColumnId`, `RowId`, `ElementId`: arena identifiers
//! - `Range`: half-open id interval used for id spaces and deltas
//! - `DataType` / `ColumnType`: primitive types and column output types
//! - `Value`: runtime values stored in column cells
//! - `function`: evaluator callables handed to the engine by its callers
//! - `Error`, `DefinitionError`, `EvalError`: error types
//!
//! # Example
//!
//! ```rust
//! use colflow_core::{Range, Value, UNRESOLVED};
//!
//! let added = Range::new(10, 15);
//! assert_eq!(added.length(), 5);
//! assert!(added.contains(12));
//!
//! let link = Value::from(UNRESOLVED);
//! assert_eq!(link.as_row_id(), None);
//! assert_eq!(Value::Int64(3).as_row_id(), Some(3));
//! ```

#![no_std]

extern crate alloc;

mod element;
mod error;
pub mod function;
mod range;
mod types;
mod value;

pub use element::{ColumnId, ElementId, RowId, TableId, UNRESOLVED};
pub use error::{DefinitionError, Error, EvalError, Result};
pub use function::{EvalResult, Evaluator, Folder, RollFn};
pub use range::Range;
pub use types::{ColumnType, DataType};
pub use value::Value;

//! Colflow Storage - Storage layer for the Colflow engine.
//!
//! This crate provides the two stores every computation reads and writes through:
//!
//! - `IdRangeStore`: a table's sliding id window `[removed_end, added_end)` plus the
//!   added/removed deltas accumulated since the last commit
//! - `ColumnStore`: the cell values of one column over its table's id window, with a
//!   default value for uninitialized or reset ids
//!
//! # Example
//!
//! ```rust
//! use colflow_core::{Range, Value};
//! use colflow_storage::{ColumnStore, IdRangeStore};
//!
//! let mut ids = IdRangeStore::new();
//! let mut prices = ColumnStore::new(Value::Float64(0.0));
//!
//! let added = ids.add(3);
//! prices.extend_to(ids.id_range().end);
//! prices.set(added.start, Value::Float64(9.5));
//!
//! assert_eq!(added, Range::new(0, 3));
//! assert_eq!(prices.get(0), &Value::Float64(9.5));
//! assert_eq!(prices.get(1), &Value::Float64(0.0));
//! ```

#![no_std]

extern crate alloc;

pub mod column_store;
pub mod id_range;

pub use column_store::ColumnStore;
pub use id_range::IdRangeStore;

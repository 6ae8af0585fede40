//! Dependency graph and evaluation order.
//!
//! - `graph`: per-element dependencies, cycle reachability and dirtiness
//! - `topology`: schema-wide layering and single-target closures

mod graph;
mod topology;

pub use topology::Topology;

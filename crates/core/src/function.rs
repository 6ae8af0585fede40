//! Evaluator callables.
//!
//! The engine never parses formulas; callers hand it already-resolved function
//! values together with the column paths whose values become the parameters.
//! Every callable reports failure through [`EvalError`] instead of panicking.

use crate::error::EvalError;
use crate::value::Value;
use alloc::boxed::Box;

/// Outcome of a single evaluator call.
pub type EvalResult = core::result::Result<Value, EvalError>;

/// Row-wise function `f(params) -> value`, used by calculate columns,
/// inline link keys and product predicates.
pub type Evaluator = Box<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

/// Aggregate fold `f(aggregate, params) -> aggregate`, used by accumulate
/// adders and removers.
pub type Folder = Box<dyn Fn(&Value, &[Value]) -> EvalResult + Send + Sync>;

/// Window fold `f(aggregate, distance, params) -> aggregate`, used by roll columns.
///
/// `distance` is positive for rows before the current one and negative for rows after it.
pub type RollFn = Box<dyn Fn(&Value, f64, &[Value]) -> EvalResult + Send + Sync>;

/// Boxes a closure as an [`Evaluator`].
pub fn evaluator<F>(f: F) -> Evaluator
where
    F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
{
    Box::new(f)
}

/// Boxes a closure as a [`Folder`].
pub fn folder<F>(f: F) -> Folder
where
    F: Fn(&Value, &[Value]) -> EvalResult + Send + Sync + 'static,
{
    Box::new(f)
}

/// Boxes a closure as a [`RollFn`].
pub fn roll_fn<F>(f: F) -> RollFn
where
    F: Fn(&Value, f64, &[Value]) -> EvalResult + Send + Sync + 'static,
{
    Box::new(f)
}

//! Ready-made folders for accumulate columns.
//!
//! `count` and `sum` come as adder/remover pairs and can be maintained from
//! deltas in both directions. `min` and `max` are monotone: removing a fact
//! cannot be undone without a rescan, so they have no remover and expect the
//! column default to be `Null`.
//!
//! All folders read the fact's value from parameter 0, except `count` which
//! ignores its parameters. `Null` facts leave the aggregate unchanged.

use alloc::format;
use colflow_core::function::folder;
use colflow_core::{EvalError, EvalResult, Folder, Value};

/// Adds one per fact.
pub fn count_adder() -> Folder {
    folder(|agg, _| Ok(Value::Int64(agg.as_i64().unwrap_or(0) + 1)))
}

/// Subtracts one per removed fact.
pub fn count_remover() -> Folder {
    folder(|agg, _| Ok(Value::Int64(agg.as_i64().unwrap_or(0) - 1)))
}

/// Adds parameter 0 to the aggregate.
pub fn sum_adder() -> Folder {
    folder(|agg, params| add(agg, first(params), 1))
}

/// Subtracts parameter 0 from the aggregate.
pub fn sum_remover() -> Folder {
    folder(|agg, params| add(agg, first(params), -1))
}

/// Keeps the smallest parameter 0 seen.
pub fn min_adder() -> Folder {
    folder(|agg, params| {
        let x = first(params);
        Ok(if x.is_null() || (!agg.is_null() && agg <= x) {
            agg.clone()
        } else {
            x.clone()
        })
    })
}

/// Keeps the largest parameter 0 seen.
pub fn max_adder() -> Folder {
    folder(|agg, params| {
        let x = first(params);
        Ok(if x.is_null() || (!agg.is_null() && agg >= x) {
            agg.clone()
        } else {
            x.clone()
        })
    })
}

#[inline]
fn first(params: &[Value]) -> &Value {
    params.first().unwrap_or(&Value::Null)
}

/// `agg + sign * x`, in integers when both sides are integers.
fn add(agg: &Value, x: &Value, sign: i64) -> EvalResult {
    match (agg, x) {
        (_, Value::Null) => Ok(agg.clone()),
        (Value::Null, Value::Int64(b)) => Ok(Value::Int64(sign * b)),
        (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a + sign * b)),
        (Value::Duration(a), Value::Duration(b)) => Ok(Value::Duration(a + sign * b)),
        _ => {
            let a = if agg.is_null() { Some(0.0) } else { agg.to_f64() };
            match (a, x.to_f64()) {
                (Some(a), Some(b)) => Ok(Value::Float64(a + sign as f64 * b)),
                _ => Err(EvalError::new(format!(
                    "cannot sum {:?} into {:?}",
                    x, agg
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count() {
        let add = count_adder();
        let remove = count_remover();
        let agg = add(&Value::Int64(0), &[]).unwrap();
        let agg = add(&agg, &[Value::from("ignored")]).unwrap();
        assert_eq!(agg, Value::Int64(2));
        assert_eq!(remove(&agg, &[]), Ok(Value::Int64(1)));
    }

    #[test]
    fn test_sum_int_and_float() {
        let add = sum_adder();
        let remove = sum_remover();
        let agg = add(&Value::Int64(0), &[Value::Int64(10)]).unwrap();
        let agg = add(&agg, &[Value::Int64(20)]).unwrap();
        assert_eq!(agg, Value::Int64(30));
        assert_eq!(remove(&agg, &[Value::Int64(10)]), Ok(Value::Int64(20)));

        let agg = add(&Value::Float64(0.0), &[Value::Float64(1.5)]).unwrap();
        assert_eq!(add(&agg, &[Value::Int64(2)]), Ok(Value::Float64(3.5)));
    }

    #[test]
    fn test_sum_skips_null_and_rejects_text() {
        let add = sum_adder();
        assert_eq!(add(&Value::Int64(4), &[Value::Null]), Ok(Value::Int64(4)));
        assert_eq!(add(&Value::Null, &[Value::Int64(4)]), Ok(Value::Int64(4)));
        assert!(add(&Value::Int64(4), &[Value::from("x")]).is_err());
    }

    #[test]
    fn test_min_max() {
        let min = min_adder();
        let max = max_adder();
        let mut lo = Value::Null;
        let mut hi = Value::Null;
        for v in [30, 10, 20] {
            lo = min(&lo, &[Value::Int64(v)]).unwrap();
            hi = max(&hi, &[Value::Int64(v)]).unwrap();
        }
        assert_eq!(lo, Value::Int64(10));
        assert_eq!(hi, Value::Int64(30));
        assert_eq!(min(&lo, &[Value::Null]), Ok(Value::Int64(10)));
    }
}

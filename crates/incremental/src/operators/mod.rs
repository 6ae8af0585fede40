//! Computation kinds.
//!
//! Column-level: calculate, link, project, accumulate, roll.
//! Table-level: product, range.
//!
//! Each kind is a set of free functions over `&mut Schema`. The driver takes the
//! definition out of its element for the duration of the call, so a kind may
//! read its definition while writing the schema.

pub mod aggregate;
pub(crate) mod accumulate;
pub(crate) mod calculate;
pub(crate) mod link;
pub(crate) mod product;
pub(crate) mod project;
pub(crate) mod range;
pub(crate) mod roll;

use crate::definition::KeySource;
use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, Range, RowId, TableId, Value};

/// Which rows an evaluation wrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Written {
    /// Only rows appended since the previous evaluation.
    Appended,
    /// Rows that earlier readers may already have seen.
    Rewritten,
}

pub(crate) type EvalOutcome = Result<Written, EvalError>;

/// Rows a cursor-driven column still has to compute, or `None` if it must
/// recompute every live row.
///
/// A full recompute is needed when incremental mode is off, the column has never
/// been evaluated under its definition, one of the `reads` columns rewrote
/// existing rows, or one of the `watched` tables changed at all.
pub(crate) fn pending_rows<'a>(
    schema: &Schema,
    column: ColumnId,
    reads: impl IntoIterator<Item = &'a ColumnId>,
    watched: &[TableId],
) -> Option<Range> {
    if !schema.config().incremental {
        return None;
    }
    let col = &schema.columns[column];
    let cursor = col.cursor?;
    let own = col.state.data_changed_at;
    if col.state.definition_changed_at > own {
        return None;
    }
    if reads
        .into_iter()
        .any(|&c| schema.columns[c].rewritten_at > own)
    {
        return None;
    }
    if watched
        .iter()
        .any(|&t| schema.tables[t].state.data_changed_at > own)
    {
        return None;
    }
    let live = schema.tables[col.input].ids.id_range();
    Some(Range::new(cursor.rows.end.max(live.start), live.end))
}

/// Evaluates one key tuple of a link or project column at input row `id`.
pub(crate) fn read_tuple(
    schema: &Schema,
    sources: &[KeySource],
    id: RowId,
    scratch: &mut Vec<Value>,
) -> Result<Vec<Value>, EvalError> {
    sources
        .iter()
        .map(|source| match source {
            KeySource::Path(path) => Ok(schema.read_path(path, id)),
            KeySource::Expr { evaluator, params } => {
                schema.read_params(params, id, scratch);
                evaluator(scratch)
            }
        })
        .collect()
}

//! Delta-maintained group aggregates.
//!
//! The column lives on the group table and folds facts of another table into
//! the group each fact's group path resolves to. Its cursor remembers which fact
//! ids and which group ids the aggregate currently reflects, so a pass only
//! unfolds facts removed since then and folds facts appended since then.

use super::EvalOutcome;
use super::Written;
use crate::definition::Accumulate;
use crate::schema::{Cursor, Schema};
use alloc::vec::Vec;
use colflow_core::{ColumnId, EvalError, Folder, Range, TableId};
use log::trace;

pub(crate) fn evaluate(schema: &mut Schema, column: ColumnId, acc: &Accumulate) -> EvalOutcome {
    let groups_table = schema.columns[column].input;
    let Some(facts_table) = acc.group.first().map(|&c| schema.columns[c].input) else {
        return Err(EvalError::new("accumulate column has an empty group path"));
    };
    let groups = schema.tables[groups_table].ids.id_range();
    let facts = schema.tables[facts_table].ids.id_range();

    match resumable_cursor(schema, column, acc, facts_table, groups) {
        Some(cursor) => {
            let fresh = Range::new(cursor.groups.end.max(groups.start), groups.end);
            schema.columns[column].data.reset(fresh);

            let unfold = Range::new(cursor.rows.start, cursor.rows.end.min(facts.start));
            let fold = Range::new(cursor.rows.end.max(facts.start), facts.end);
            trace!(
                "accumulate {}: unfold {}, fold {}",
                schema.columns[column].name,
                unfold,
                fold
            );
            if let Some(remover) = &acc.remover {
                apply(schema, column, acc, remover, unfold)?;
            }
            apply(schema, column, acc, &acc.adder, fold)?;
        }
        None => {
            schema.columns[column].data.reset(groups);
            apply(schema, column, acc, &acc.adder, facts)?;
        }
    }

    schema.columns[column].cursor = Some(Cursor {
        rows: facts,
        groups,
    });
    Ok(Written::Rewritten)
}

/// The cursor to continue from, or `None` if the aggregate must be re-folded
/// from scratch.
fn resumable_cursor(
    schema: &Schema,
    column: ColumnId,
    acc: &Accumulate,
    facts_table: TableId,
    groups: Range,
) -> Option<Cursor> {
    if !schema.config().incremental {
        return None;
    }
    let col = &schema.columns[column];
    let cursor = col.cursor?;
    let own = col.state.data_changed_at;
    // a repopulated group table moves its start
    if col.state.definition_changed_at > own || cursor.groups.start != groups.start {
        return None;
    }
    // facts already folded must still read as they did
    let rewritten = acc
        .group
        .iter()
        .chain(acc.params.iter().flatten())
        .any(|&c| schema.columns[c].rewritten_at > own);
    if rewritten {
        return None;
    }
    let ids = &schema.tables[facts_table].ids;
    let facts = ids.id_range();
    let unfold = Range::new(cursor.rows.start, cursor.rows.end.min(facts.start));
    if acc.remover.is_some() && !unfold.is_empty() && unfold.start < ids.removed_range().start {
        // removed facts were committed away before they could be unfolded
        return None;
    }
    Some(cursor)
}

/// Folds every fact in `facts` into its group with `f`.
fn apply(
    schema: &mut Schema,
    column: ColumnId,
    acc: &Accumulate,
    f: &Folder,
    facts: Range,
) -> Result<(), EvalError> {
    let groups = schema.tables[schema.columns[column].input].ids.id_range();
    let mut params = Vec::with_capacity(acc.params.len());
    for fact in facts.ids() {
        let Some(group) = schema.read_path(&acc.group, fact).as_row_id() else {
            continue;
        };
        if !groups.contains(group) {
            continue;
        }
        schema.read_params(&acc.params, fact, &mut params);
        let next = f(schema.columns[column].data.get(group), &params)?;
        schema.columns[column].data.set(group, next);
    }
    Ok(())
}

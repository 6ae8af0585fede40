//! Arena identifiers for schema elements and rows.

use core::fmt;

/// Index of a table in the schema's table arena.
pub type TableId = usize;

/// Index of a column in the schema's column arena.
pub type ColumnId = usize;

/// Identifier of a row within a table's id space.
///
/// Ids are assigned by monotonic append and never reused.
pub type RowId = i64;

/// Link value meaning "no matching row".
pub const UNRESOLVED: RowId = -1;

/// A node of the dependency graph: either a table or a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    Table(TableId),
    Column(ColumnId),
}

impl ElementId {
    /// Returns the table id if this element is a table.
    #[inline]
    pub fn as_table(&self) -> Option<TableId> {
        match self {
            ElementId::Table(id) => Some(*id),
            ElementId::Column(_) => None,
        }
    }

    /// Returns the column id if this element is a column.
    #[inline]
    pub fn as_column(&self) -> Option<ColumnId> {
        match self {
            ElementId::Column(id) => Some(*id),
            ElementId::Table(_) => None,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Table(id) => write!(f, "table#{}", id),
            ElementId::Column(id) => write!(f, "column#{}", id),
        }
    }
}

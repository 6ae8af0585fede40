//! Data type definitions for Colflow.
//!
//! `DataType` enumerates the primitive cell types; `ColumnType` is what a column
//! produces, either a primitive value or ids into another table.

use crate::element::TableId;

/// Supported primitive data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Time span in milliseconds
    Duration,
}

impl DataType {
    /// Returns whether values of this type have a numeric distance.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int64 | DataType::Float64 | DataType::DateTime | DataType::Duration
        )
    }
}

/// The output type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Scalar column holding primitive values.
    Primitive(DataType),
    /// Link/project/key column holding row ids of another table (or `-1`).
    Table(TableId),
}

impl ColumnType {
    /// Returns the referenced table if this column holds row ids.
    #[inline]
    pub fn table(&self) -> Option<TableId> {
        match self {
            ColumnType::Table(id) => Some(*id),
            ColumnType::Primitive(_) => None,
        }
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, ColumnType::Primitive(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int64, DataType::Int64);
        assert_ne!(DataType::Int64, DataType::Float64);
    }

    #[test]
    fn test_numeric_types() {
        assert!(DataType::Int64.is_numeric());
        assert!(DataType::DateTime.is_numeric());
        assert!(!DataType::String.is_numeric());
        assert!(!DataType::Boolean.is_numeric());
    }

    #[test]
    fn test_column_type() {
        assert_eq!(ColumnType::Table(4).table(), Some(4));
        assert_eq!(ColumnType::Primitive(DataType::Float64).table(), None);
        assert!(ColumnType::Primitive(DataType::String).is_primitive());
    }
}

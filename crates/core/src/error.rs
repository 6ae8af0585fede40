//! Error types for Colflow.
//!
//! `Error` is returned by the mutation, definition and introspection surfaces.
//! `DefinitionError` and `EvalError` are additionally recorded on the element
//! they concern, as its definition-error and evaluation-error lists.

use crate::element::{ColumnId, ElementId, RowId, TableId};
use crate::range::Range;
use alloc::string::String;

/// Result type alias for Colflow operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for schema operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Table id is not part of the schema.
    #[error("Table not found: {id}")]
    TableNotFound { id: TableId },
    /// Column id is not part of the schema.
    #[error("Column not found: {id}")]
    ColumnNotFound { id: ColumnId },
    /// Row id outside the table's current id range.
    #[error("Row {row} is outside the id range {range} of table {table}")]
    RowOutOfRange {
        table: TableId,
        row: RowId,
        range: Range,
    },
    /// Invalid operation.
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
    /// A definition was rejected.
    #[error("Definition rejected: {0}")]
    Definition(#[from] DefinitionError),
}

impl Error {
    /// Creates a table not found error.
    pub fn table_not_found(id: TableId) -> Self {
        Error::TableNotFound { id }
    }

    /// Creates a column not found error.
    pub fn column_not_found(id: ColumnId) -> Self {
        Error::ColumnNotFound { id }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}

/// A permanent error raised when a definition is attached.
///
/// It suppresses evaluation of the element and everything downstream of it until
/// the definition is replaced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    /// The element would (transitively) read itself.
    #[error("Cyclic dependency: {element} depends on itself")]
    CyclicDependency { element: ElementId },
    /// A column path does not chain from its anchor table or ends in the wrong type.
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
    /// A column used as a key is not a key column of the table.
    #[error("Column {column} is not a key column of table {table}")]
    NotKeyColumn { table: TableId, column: ColumnId },
    /// Key columns and key values differ in number.
    #[error("Key arity mismatch: {keys} keys, {values} values")]
    KeyArity { keys: usize, values: usize },
    /// A project column whose output cannot receive rows.
    #[error("Column {column} does not output rows of a table that can be populated")]
    NotPopulationCapable { column: ColumnId },
    /// Other malformed definition parameters.
    #[error("Invalid definition: {message}")]
    Invalid { message: String },
}

impl DefinitionError {
    /// Creates an invalid path error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        DefinitionError::InvalidPath {
            message: message.into(),
        }
    }

    /// Creates an invalid definition error.
    pub fn invalid(message: impl Into<String>) -> Self {
        DefinitionError::Invalid {
            message: message.into(),
        }
    }
}

/// A failure reported while an element is being evaluated.
///
/// Cleared at the start of every pass for the element being retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

//! Error types for sheetbase-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetbase-core
///
/// Every operation that returns one of these leaves the table or workbook
/// it was called on unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Row position out of bounds
    #[error("Row index {index} out of bounds (rows: {len})")]
    RowOutOfBounds { index: usize, len: usize },

    /// Column not found by name
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Column name already in use
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    /// Column name cannot be stored as a header
    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    /// Record keys disagree with the table's column set
    #[error("Column mismatch: missing {missing:?}, extra {extra:?}")]
    ColumnMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// Positional row has the wrong number of values
    #[error("Row has {actual} values but the table has {expected} columns")]
    RowLength { expected: usize, actual: usize },

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),
}

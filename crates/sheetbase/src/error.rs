//! Error types for sheetbase

use std::path::PathBuf;

use sheetbase_xlsx::XlsxError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the database layer
///
/// Structural errors (`ColumnMismatch`, `IndexOutOfRange`, `NoSuchColumn`,
/// `NoSuchTable`) leave every in-memory table unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Workbook file does not exist under the storage root
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Table (sheet) not present in the database
    #[error("No such table: {0}")]
    NoSuchTable(String),

    /// Record keys disagree with the table's column set
    #[error("Column mismatch: missing {missing:?}, extra {extra:?}")]
    ColumnMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// Row position out of bounds
    #[error("Row index {index} out of range (rows: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Column not present in the table
    #[error("No such column: {0}")]
    NoSuchColumn(String),

    /// Column name that a workbook header cannot hold (the empty name)
    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    /// Save requested with neither a backing path nor an output file
    #[error("Database has no backing path and no output file was given")]
    NoBackingPath,

    /// Destination is held open exclusively by another process
    #[error("File is locked by another process: {}", path.display())]
    FileLocked { path: PathBuf },

    /// Writing the workbook failed
    #[error("Failed to save {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// Reading the workbook failed
    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// Filesystem error outside the codec (storage root creation)
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sheet name rejected by the workbook format
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Any other table-level failure
    #[error(transparent)]
    Table(sheetbase_core::Error),
}

impl Error {
    /// Whether this is one of the "not found" kinds (missing file or table)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound { .. } | Error::NoSuchTable(_))
    }
}

impl From<sheetbase_core::Error> for Error {
    fn from(err: sheetbase_core::Error) -> Self {
        use sheetbase_core::Error as Core;

        match err {
            Core::RowOutOfBounds { index, len } => Error::IndexOutOfRange { index, len },
            Core::ColumnNotFound(name) => Error::NoSuchColumn(name),
            Core::InvalidColumnName(name) => Error::InvalidColumnName(name),
            Core::ColumnMismatch { missing, extra } => Error::ColumnMismatch { missing, extra },
            Core::SheetNotFound(name) => Error::NoSuchTable(name),
            Core::InvalidSheetName(msg) => Error::InvalidSheetName(msg),
            Core::DuplicateSheetName(name) => {
                Error::InvalidSheetName(format!("'{}' is already used", name))
            }
            other => Error::Table(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_kinds() {
        let err: Error = sheetbase_core::Error::RowOutOfBounds { index: 4, len: 2 }.into();
        assert!(matches!(err, Error::IndexOutOfRange { index: 4, len: 2 }));

        let err: Error = sheetbase_core::Error::ColumnNotFound("Qty".into()).into();
        assert!(matches!(err, Error::NoSuchColumn(ref c) if c == "Qty"));

        let err: Error = sheetbase_core::Error::InvalidColumnName(String::new()).into();
        assert!(matches!(err, Error::InvalidColumnName(ref c) if c.is_empty()));

        let err: Error = sheetbase_core::Error::SheetNotFound("Main".into()).into();
        assert!(err.is_not_found());

        let err: Error = sheetbase_core::Error::DuplicateColumn("ID".into()).into();
        assert!(matches!(err, Error::Table(_)));
    }

    #[test]
    fn test_display_carries_path() {
        let err = Error::FileLocked {
            path: PathBuf::from("data/shop.xlsx"),
        };
        assert_eq!(
            err.to_string(),
            "File is locked by another process: data/shop.xlsx"
        );
    }
}

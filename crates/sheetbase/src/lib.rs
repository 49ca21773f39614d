//! # sheetbase
//!
//! Treat an XLSX workbook as a small database: every sheet is a named table
//! whose first row holds the column names.
//!
//! ## Components
//!
//! - [`Creator`] writes a new workbook with one empty `ID` column
//! - [`Loader`] reads a workbook into a [`Database`]
//! - [`Reader`] lists, previews and describes tables
//! - [`Editor`] adds, updates, renames, drops and finds rows and columns
//! - [`Persister`] writes a database back, one sheet per table
//!
//! File names are resolved against the storage root held by a
//! [`StorageConfig`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetbase::prelude::*;
//!
//! fn main() -> sheetbase::Result<()> {
//!     let config = StorageConfig::default();
//!     Creator::new(config.clone()).create("shop")?;
//!
//!     let mut db = Loader::new(config).load("shop.xlsx")?;
//!     let mut editor = db.editor("Main")?;
//!     editor.add_row(Row::new().with("ID", 1))?;
//!     editor.save()?;
//!
//!     let shape = db.reader().describe("Main")?;
//!     assert_eq!(shape.row_count, 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod creator;
pub mod database;
pub mod editor;
pub mod error;
pub mod loader;
pub mod persist;
pub mod prelude;
pub mod reader;

pub use config::{normalize_workbook_name, StorageConfig, WORKBOOK_EXTENSION};
pub use creator::{Creator, DEFAULT_SHEET, ID_COLUMN};
pub use database::Database;
pub use editor::{Editor, Outcome, Refusal};
pub use error::{Error, Result};
pub use loader::Loader;
pub use persist::Persister;
pub use reader::{Reader, TableShape, DEFAULT_PREVIEW_ROWS};

// Re-export core types
pub use sheetbase_core::{
    Column, ColumnKind, Row, Shape, Table, Value, Workbook, MAX_COLS, MAX_ROWS,
};

// Re-export I/O types
pub use sheetbase_xlsx::{XlsxError, XlsxReader, XlsxWriter};

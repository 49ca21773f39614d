//! # sheetbase-core
//!
//! Core data structures for the sheetbase workbook store.
//!
//! This crate provides the fundamental types used throughout sheetbase:
//! - [`Value`] - A single cell value (empty, boolean, number, string)
//! - [`Table`] and [`Column`] - The column-oriented table container
//! - [`Row`] - A transient record keyed by column name
//! - [`Workbook`] - An ordered mapping of sheet names to tables
//!
//! ## Example
//!
//! ```rust
//! use sheetbase_core::{Row, Table, Value};
//!
//! let mut table = Table::with_columns(["ID", "Name"]).unwrap();
//! table.push_record(Row::new().with("ID", 1).with("Name", "apple")).unwrap();
//!
//! assert_eq!(table.row_count(), 1);
//! assert_eq!(table.value(0, "Name"), Some(&Value::from("apple")));
//! ```

pub mod error;
pub mod row;
pub mod table;
pub mod value;
pub mod workbook;

// Re-exports for convenience
pub use error::{Error, Result};
pub use row::Row;
pub use table::{Column, ColumnKind, Shape, Table};
pub use value::{SharedString, Value};
pub use workbook::{validate_sheet_name, Workbook};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: usize = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: usize = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

//! # sheetbase-xlsx
//!
//! XLSX (Office Open XML) reader and writer for sheetbase.
//!
//! Each sheet maps to one [`Table`](sheetbase_core::Table): row 1 holds the
//! column headers and every later row is a record. Only values travel
//! through the codec; styles, formulas and other sheet features are not
//! preserved.

pub mod error;
pub mod reader;
pub mod writer;

mod escape;
mod reference;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

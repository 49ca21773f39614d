//! In-memory database state

use std::path::{Path, PathBuf};

use sheetbase_core::{Table, Workbook};

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// A workbook held in memory, plus the file it was loaded from
///
/// Tables keep their insertion order, which is also the sheet order used
/// when the database is saved. Nothing is written to disk until a save is
/// requested explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    backing_path: Option<PathBuf>,
    tables: Workbook,
}

impl Database {
    /// Create an empty database with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a workbook, optionally bound to the file it came from
    pub fn from_workbook(tables: Workbook, backing_path: Option<PathBuf>) -> Self {
        Self {
            backing_path,
            tables,
        }
    }

    /// File used by saves that do not name an output
    pub fn backing_path(&self) -> Option<&Path> {
        self.backing_path.as_deref()
    }

    /// Bind the database to a new backing file
    pub fn set_backing_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.backing_path = Some(path.into());
    }

    /// Table names in insertion order
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.names().collect()
    }

    /// All tables, as the workbook that will be saved
    pub fn tables(&self) -> &Workbook {
        &self.tables
    }

    /// Check if a table exists
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .table(name)
            .ok_or_else(|| Error::NoSuchTable(name.to_string()))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .table_mut(name)
            .ok_or_else(|| Error::NoSuchTable(name.to_string()))
    }

    /// Add a table, or replace the one stored under the same name
    ///
    /// A replaced table keeps its position; a new one is appended.
    pub fn insert_table<S: Into<String>>(&mut self, name: S, table: Table) -> Result<Option<Table>> {
        Ok(self.tables.insert(name, table)?)
    }

    /// Read-only view over this database
    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self)
    }

    /// Editor bound to one table of this database
    ///
    /// Each call builds a fresh editor, so several tables can be edited in
    /// turn through the same database.
    pub fn editor(&mut self, table: &str) -> Result<Editor<'_>> {
        Editor::new(self, table)
    }
}

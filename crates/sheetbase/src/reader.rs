//! Read-only queries over a database

use sheetbase_core::{ColumnKind, Table};

use crate::database::Database;
use crate::error::Result;

/// Rows shown by [`Reader::preview`] when no count is given
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Shape summary of one table, computed on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    /// Inferred value kind of each column, aligned with `column_names`
    pub column_kinds: Vec<ColumnKind>,
}

/// Stateless read-only view over a [`Database`]
#[derive(Debug, Clone, Copy)]
pub struct Reader<'db> {
    db: &'db Database,
}

impl<'db> Reader<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Table names in insertion order
    pub fn list_tables(&self) -> Vec<&'db str> {
        self.db.list_tables()
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&'db Table> {
        self.db.table(name)
    }

    /// The first `min(n, row_count)` rows of a table
    ///
    /// `n == 0` yields a table with the same columns and no rows.
    pub fn preview(&self, name: &str, n: usize) -> Result<Table> {
        Ok(self.get_table(name)?.head(n))
    }

    /// Row count, column count and column names of a table
    pub fn describe(&self, name: &str) -> Result<TableShape> {
        let table = self.get_table(name)?;
        Ok(TableShape {
            row_count: table.row_count(),
            column_count: table.column_count(),
            column_names: table.column_names().map(str::to_string).collect(),
            column_kinds: table.columns().iter().map(|c| c.kind()).collect(),
        })
    }
}

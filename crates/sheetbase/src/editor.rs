//! Mutations on one table of a database
//!
//! Rows are addressed by position. Positions are not stable identifiers:
//! dropping row `i` moves every later row down by one.

use std::fmt;

use sheetbase_core::{Column, Row, Table, Value};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::persist;

/// Result of an operation that may decline without failing
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The change was made
    Applied,
    /// Nothing was changed
    Refused(Refusal),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Why an operation declined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The requested column name is already in use
    ColumnExists(String),
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::ColumnExists(name) => write!(f, "column '{}' already exists", name),
        }
    }
}

/// Editor bound to a single table
///
/// The editor works on the table stored in the database, so every change is
/// visible through the database as soon as the call returns. Failed calls
/// leave the table unchanged.
#[derive(Debug)]
pub struct Editor<'db> {
    db: &'db mut Database,
    table: String,
}

impl<'db> Editor<'db> {
    /// Bind to `table`, which must exist in `db`
    pub fn new<S: Into<String>>(db: &'db mut Database, table: S) -> Result<Self> {
        let table = table.into();
        if !db.contains_table(&table) {
            return Err(Error::NoSuchTable(table));
        }
        Ok(Self { db, table })
    }

    /// Name of the bound table
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The bound table
    pub fn table(&self) -> Result<&Table> {
        self.db.table(&self.table)
    }

    /// The database the editor writes into
    pub fn database(&self) -> &Database {
        self.db
    }

    fn table_mut(&mut self) -> Result<&mut Table> {
        self.db.table_mut(&self.table)
    }

    /// Append a record whose keys are exactly the table's columns
    pub fn add_row(&mut self, row: Row) -> Result<()> {
        let name = self.table.clone();
        let table = self.table_mut()?;
        table.push_record(row)?;
        tracing::debug!(table = %name, rows = table.row_count(), "row added");
        Ok(())
    }

    /// Append a column filled with `default`
    ///
    /// Refuses, without changing anything, when the name is taken.
    pub fn add_column(&mut self, name: &str, default: Value) -> Result<Outcome> {
        let table_name = self.table.clone();
        let table = self.table_mut()?;
        if table.contains_column(name) {
            tracing::debug!(table = %table_name, column = name, "column already exists");
            return Ok(Outcome::Refused(Refusal::ColumnExists(name.to_string())));
        }
        table.add_column(name, default)?;
        tracing::debug!(table = %table_name, column = name, "column added");
        Ok(Outcome::Applied)
    }

    /// Replace one cell, returning its previous value
    pub fn update_row<V: Into<Value>>(
        &mut self,
        row_index: usize,
        column: &str,
        value: V,
    ) -> Result<Value> {
        let name = self.table.clone();
        let old = self.table_mut()?.set_value(row_index, column, value.into())?;
        tracing::debug!(table = %name, row = row_index, column, "cell updated");
        Ok(old)
    }

    /// Rename a column in place
    ///
    /// Refuses when `new` is already a column name, which includes
    /// `old == new`.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<Outcome> {
        let name = self.table.clone();
        let table = self.table_mut()?;
        if table.contains_column(new) {
            tracing::debug!(table = %name, column = new, "rename target already exists");
            return Ok(Outcome::Refused(Refusal::ColumnExists(new.to_string())));
        }
        table.rename_column(old, new)?;
        tracing::debug!(table = %name, old, new, "column renamed");
        Ok(Outcome::Applied)
    }

    /// Remove a row, returning it; later rows shift down by one
    pub fn drop_row(&mut self, row_index: usize) -> Result<Row> {
        let name = self.table.clone();
        let row = self.table_mut()?.remove_row(row_index)?;
        tracing::debug!(table = %name, row = row_index, "row dropped");
        Ok(row)
    }

    /// Remove a column, returning it
    pub fn drop_column(&mut self, column: &str) -> Result<Column> {
        let name = self.table.clone();
        let dropped = self.table_mut()?.drop_column(column)?;
        tracing::debug!(table = %name, column, "column dropped");
        Ok(dropped)
    }

    /// Rows whose `column` equals `value`, in table order
    ///
    /// No match is an empty table, not an error.
    pub fn find_by_column(&self, column: &str, value: &Value) -> Result<Table> {
        Ok(self.table()?.filter_eq(column, value)?)
    }

    /// A one-row table holding the row at `row_index`
    pub fn find_by_row(&self, row_index: usize) -> Result<Table> {
        Ok(self.table()?.take_rows(&[row_index])?)
    }

    /// Write every table of the database to its backing file
    pub fn save(&self) -> Result<()> {
        let path = self.db.backing_path().ok_or(Error::NoBackingPath)?;
        persist::write_workbook(path, self.db.tables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn db() -> Database {
        let table = Table::from_rows(
            ["ID", "Name"],
            vec![
                vec![Value::from(1), Value::from("apple")],
                vec![Value::from(2), Value::from("pear")],
                vec![Value::from(3), Value::from("apple")],
            ],
        )
        .unwrap();
        let mut db = Database::new();
        db.insert_table("Main", table).unwrap();
        db.insert_table("Other", Table::new()).unwrap();
        db
    }

    #[test]
    fn test_bind_missing_table() {
        let mut db = db();
        let err = Editor::new(&mut db, "Nope").unwrap_err();
        assert!(matches!(err, Error::NoSuchTable(_)));
    }

    #[test]
    fn test_add_row_visible_through_database() {
        let mut db = db();
        db.editor("Main")
            .unwrap()
            .add_row(Row::new().with("Name", "fig").with("ID", 4))
            .unwrap();

        let table = db.table("Main").unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(
            table.row(3),
            Some(Row::new().with("ID", 4).with("Name", "fig"))
        );
    }

    #[test]
    fn test_add_row_column_mismatch() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();
        let err = editor
            .add_row(Row::new().with("ID", 4).with("Qty", 2))
            .unwrap_err();

        match err {
            Error::ColumnMismatch { missing, extra } => {
                assert_eq!(missing, vec!["Name"]);
                assert_eq!(extra, vec!["Qty"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(editor.table().unwrap().row_count(), 3);
    }

    #[test]
    fn test_add_column_refuses_duplicate() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();

        assert_eq!(
            editor.add_column("Qty", Value::from(0)).unwrap(),
            Outcome::Applied
        );
        assert_eq!(
            editor.add_column("Qty", Value::from(9)).unwrap(),
            Outcome::Refused(Refusal::ColumnExists("Qty".into()))
        );

        let table = editor.table().unwrap();
        assert_eq!(table.column_count(), 3);
        assert!(table.column("Qty").unwrap().values().iter().all(|v| *v == Value::from(0)));
    }

    #[test]
    fn test_update_row() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();

        let old = editor.update_row(1, "Name", "plum").unwrap();
        assert_eq!(old, Value::from("pear"));
        assert_eq!(editor.table().unwrap().value(1, "Name"), Some(&Value::from("plum")));

        assert!(matches!(
            editor.update_row(3, "Name", "x"),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            editor.update_row(0, "Qty", 1),
            Err(Error::NoSuchColumn(_))
        ));
        assert_eq!(editor.table().unwrap().value(0, "Name"), Some(&Value::from("apple")));
    }

    #[test]
    fn test_rename_column() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();

        assert_eq!(
            editor.rename_column("ID", "ID").unwrap(),
            Outcome::Refused(Refusal::ColumnExists("ID".into()))
        );
        assert_eq!(
            editor.rename_column("ID", "Name").unwrap(),
            Outcome::Refused(Refusal::ColumnExists("Name".into()))
        );
        assert!(matches!(
            editor.rename_column("Qty", "Amount"),
            Err(Error::NoSuchColumn(_))
        ));

        assert!(editor.rename_column("ID", "Key").unwrap().is_applied());
        let table = editor.table().unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Key", "Name"]);
        assert_eq!(table.value(2, "Key"), Some(&Value::from(3)));
    }

    #[test]
    fn test_drop_row_shifts_later_rows() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();

        let dropped = editor.drop_row(0).unwrap();
        assert_eq!(dropped.get("Name"), Some(&Value::from("apple")));

        let table = editor.table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "ID"), Some(&Value::from(2)));
        assert_eq!(table.value(1, "ID"), Some(&Value::from(3)));

        assert!(matches!(
            editor.drop_row(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_drop_column() {
        let mut db = db();
        let mut editor = db.editor("Main").unwrap();

        let dropped = editor.drop_column("ID").unwrap();
        assert_eq!(dropped.name(), "ID");
        assert_eq!(
            editor.table().unwrap().column_names().collect::<Vec<_>>(),
            vec!["Name"]
        );
        assert!(matches!(editor.drop_column("ID"), Err(Error::NoSuchColumn(_))));
    }

    #[test]
    fn test_find_by_column() {
        let mut db = db();
        let editor = db.editor("Main").unwrap();

        let found = editor.find_by_column("Name", &Value::from("apple")).unwrap();
        let ids: Vec<_> = found.column("ID").unwrap().values().to_vec();
        assert_eq!(ids, vec![Value::from(1), Value::from(3)]);

        let none = editor.find_by_column("Name", &Value::from("kiwi")).unwrap();
        assert_eq!(none.row_count(), 0);
        assert_eq!(none.column_count(), 2);

        // No coercion between text and numbers
        let none = editor.find_by_column("ID", &Value::from("1")).unwrap();
        assert!(none.is_empty());

        assert!(matches!(
            editor.find_by_column("Qty", &Value::from(1)),
            Err(Error::NoSuchColumn(_))
        ));
    }

    #[test]
    fn test_find_by_row() {
        let mut db = db();
        let editor = db.editor("Main").unwrap();

        let found = editor.find_by_row(1).unwrap();
        assert_eq!(found.row_count(), 1);
        assert_eq!(found.row(0), Some(Row::new().with("ID", 2).with("Name", "pear")));

        assert!(matches!(
            editor.find_by_row(7),
            Err(Error::IndexOutOfRange { index: 7, len: 3 })
        ));
    }

    #[test]
    fn test_save_without_backing_path() {
        let mut db = db();
        let editor = db.editor("Other").unwrap();
        assert!(matches!(editor.save(), Err(Error::NoBackingPath)));
    }

    #[test]
    fn test_editors_in_turn() {
        let mut db = db();
        let outcome = db
            .editor("Other")
            .unwrap()
            .add_column("Note", Value::Empty)
            .unwrap();
        assert!(outcome.is_applied());
        db.editor("Main").unwrap().drop_row(2).unwrap();

        assert_eq!(db.table("Other").unwrap().column_count(), 1);
        assert_eq!(db.table("Main").unwrap().row_count(), 2);
    }
}

//! Column-oriented table container
//!
//! A [`Table`] is an ordered set of named [`Column`]s whose values line up by
//! row position. Positions are contiguous (`0..row_count`) and are *not*
//! stable identifiers: removing a row shifts every later row down by one.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// Inferred content type of a column (empty cells are ignored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// No non-empty cells
    Empty,
    Boolean,
    Number,
    Text,
    /// More than one kind of non-empty value
    Mixed,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Number => "number",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named column of values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Create a column from its name and values
    pub fn new<S: Into<String>>(name: S, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All values, in row order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at a row position
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the column holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Infer the content type from the non-empty values
    pub fn kind(&self) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for value in &self.values {
            let next = match value {
                Value::Empty => continue,
                Value::Boolean(_) => ColumnKind::Boolean,
                Value::Number(_) => ColumnKind::Number,
                Value::String(_) => ColumnKind::Text,
            };
            if kind == ColumnKind::Empty {
                kind = next;
            } else if kind != next {
                return ColumnKind::Mixed;
            }
        }
        kind
    }
}

/// Row and column counts of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

/// An ordered set of equally long named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    /// Tracked separately so a table keeps its rows when every column is dropped
    rows: usize,
}

impl Table {
    /// Create a table with no columns and no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the given columns and no rows
    pub fn with_columns<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();
        Self::from_columns(columns)
    }

    /// Build a table from complete columns
    ///
    /// Names must be non-empty and unique, and every column must have the
    /// same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            check_column_name(&column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }

        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(Error::RowLength {
                expected: rows,
                actual: bad.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from column names and positional rows
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::with_columns(names)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Row and column counts
    pub fn shape(&self) -> Shape {
        Shape {
            rows: self.rows,
            columns: self.columns.len(),
        }
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// All columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a single cell
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Assemble the record at a row position
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.values[index].clone()))
                .collect(),
        )
    }

    /// Iterate over all records in row order
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.rows).filter_map(move |i| self.row(i))
    }

    /// Append a row given positionally, one value per column
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::RowLength {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    /// Append a record whose keys match the column set exactly
    ///
    /// A record that is missing a column or names an unknown one is rejected
    /// with [`Error::ColumnMismatch`] listing both sides.
    pub fn push_record(&mut self, mut record: Row) -> Result<()> {
        self.check_record(&record)?;
        let values = self
            .columns
            .iter()
            .map(|c| record.remove(&c.name).unwrap_or_default())
            .collect();
        self.push_row(values)
    }

    /// Compare a record's keys with the column set
    pub fn check_record(&self, record: &Row) -> Result<()> {
        let missing: Vec<String> = self
            .column_names()
            .filter(|name| record.get(name).is_none())
            .map(str::to_string)
            .collect();
        let extra: Vec<String> = record
            .keys()
            .filter(|key| !self.contains_column(key))
            .map(str::to_string)
            .collect();

        if missing.is_empty() && extra.is_empty() {
            Ok(())
        } else {
            Err(Error::ColumnMismatch { missing, extra })
        }
    }

    /// Replace one cell, returning the previous value
    pub fn set_value(&mut self, row: usize, column: &str, value: Value) -> Result<Value> {
        self.check_row(row)?;
        let idx = self
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        Ok(std::mem::replace(&mut self.columns[idx].values[row], value))
    }

    /// Append a column filled with `default` for every existing row
    pub fn add_column<S: Into<String>>(&mut self, name: S, default: Value) -> Result<()> {
        let name = name.into();
        check_column_name(&name)?;
        if self.contains_column(&name) {
            return Err(Error::DuplicateColumn(name));
        }
        self.columns
            .push(Column::new(name, vec![default; self.rows]));
        Ok(())
    }

    /// Rename a column, keeping its position and data
    ///
    /// Fails with [`Error::DuplicateColumn`] when `new` is already taken,
    /// including the case `old == new`.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<()> {
        check_column_name(new)?;
        if self.contains_column(new) {
            return Err(Error::DuplicateColumn(new.to_string()));
        }
        let idx = self
            .column_index(old)
            .ok_or_else(|| Error::ColumnNotFound(old.to_string()))?;
        self.columns[idx].name = new.to_string();
        Ok(())
    }

    /// Remove a column, returning it
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        Ok(self.columns.remove(idx))
    }

    /// Remove a row, returning it; later rows shift down by one
    pub fn remove_row(&mut self, index: usize) -> Result<Row> {
        self.check_row(index)?;
        let row = self
            .columns
            .iter_mut()
            .map(|c| (c.name.clone(), c.values.remove(index)))
            .collect();
        self.rows -= 1;
        Ok(row)
    }

    /// The first `min(n, row_count)` rows
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.rows);
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[..n].to_vec()))
                .collect(),
            rows: n,
        }
    }

    /// A new table holding the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        for &index in indices {
            self.check_row(index)?;
        }
        Ok(self.select(indices))
    }

    /// Rows whose value in `column` equals `value`, in original order
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Table> {
        let col = self
            .column(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        let indices: Vec<usize> = col
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .collect();
        Ok(self.select(&indices))
    }

    fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| {
                    let values = indices.iter().map(|&i| c.values[i].clone()).collect();
                    Column::new(c.name.clone(), values)
                })
                .collect(),
            rows: indices.len(),
        }
    }

    fn check_row(&self, index: usize) -> Result<()> {
        if index < self.rows {
            Ok(())
        } else {
            Err(Error::RowOutOfBounds {
                index,
                len: self.rows,
            })
        }
    }
}

impl fmt::Display for Table {
    /// Plain-text grid with row positions in the first column
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.rows + 1);
        grid.push(
            std::iter::once(String::new())
                .chain(self.column_names().map(str::to_string))
                .collect(),
        );
        for i in 0..self.rows {
            grid.push(
                std::iter::once(i.to_string())
                    .chain(self.columns.iter().map(|c| c.values[i].to_string()))
                    .collect(),
            );
        }

        let mut widths = vec![0usize; self.columns.len() + 1];
        for line in &grid {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for (n, line) in grid.iter().enumerate() {
            let text = line
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", text.trim_end())?;

            if n == 0 {
                let rule = widths
                    .iter()
                    .map(|&w| "-".repeat(w))
                    .collect::<Vec<_>>()
                    .join("-+-");
                writeln!(f, "{}", rule)?;
            }
        }
        Ok(())
    }
}

/// A blank header cell reads back as a generated name, so empty names are
/// not allowed
fn check_column_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidColumnName(name.to_string()));
    }
    Ok(())
}

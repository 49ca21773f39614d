//! Workbook type - an ordered mapping of sheet names to tables

use crate::error::{Error, Result};
use crate::table::Table;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (ordered collection of named tables)
///
/// Insertion order is preserved and is the order sheets are written in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    /// Create an empty workbook with no sheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheet names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(name, table)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Check if a sheet exists (exact name match)
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get a table by sheet name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, table)| table)
    }

    /// Get a mutable table by sheet name
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, table)| table)
    }

    /// Add a new sheet at the end
    pub fn add_sheet<S: Into<String>>(&mut self, name: S, table: Table) -> Result<usize> {
        let name = name.into();
        self.check_new_name(&name)?;
        self.sheets.push((name, table));
        Ok(self.sheets.len() - 1)
    }

    /// Store a table under `name`
    ///
    /// An existing sheet of that name is replaced in place (its position is
    /// kept); otherwise the sheet is appended. Returns the replaced table.
    pub fn insert<S: Into<String>>(&mut self, name: S, table: Table) -> Result<Option<Table>> {
        let name = name.into();
        match self.position(&name) {
            Some(index) => Ok(Some(std::mem::replace(&mut self.sheets[index].1, table))),
            None => {
                self.add_sheet(name, table)?;
                Ok(None)
            }
        }
    }

    /// Remove a sheet by name
    pub fn remove(&mut self, name: &str) -> Result<Table> {
        let index = self
            .position(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        Ok(self.sheets.remove(index).1)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|(n, _)| n == name)
    }

    /// Validate a name for a new sheet
    fn check_new_name(&self, name: &str) -> Result<()> {
        validate_sheet_name(name)?;

        // Check for duplicate names (case-insensitive)
        let name_lower = name.to_lowercase();
        if self
            .sheets
            .iter()
            .any(|(existing, _)| existing.to_lowercase() == name_lower)
        {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

/// Check a sheet name against the workbook format's rules
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name too long (max {} characters)",
            MAX_SHEET_NAME_LEN
        )));
    }

    const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
    for c in INVALID_CHARS {
        if name.contains(*c) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }
    }

    Ok(())
}

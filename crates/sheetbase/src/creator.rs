//! Creating new, empty workbook files

use std::path::PathBuf;

use sheetbase_core::{Table, Workbook};

use crate::config::{normalize_workbook_name, StorageConfig};
use crate::error::Result;
use crate::persist;

/// Sheet name used when none is given
pub const DEFAULT_SHEET: &str = "Main";

/// The single column of a freshly created table
pub const ID_COLUMN: &str = "ID";

/// Writes new workbook files under the storage root
#[derive(Debug, Clone, Default)]
pub struct Creator {
    config: StorageConfig,
}

impl Creator {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Create `name` with a single empty `Main` sheet
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        self.create_with_sheet(name, DEFAULT_SHEET)
    }

    /// Create `name` with one sheet holding an empty `ID` column
    ///
    /// `.xlsx` is appended to `name` when missing and the storage root is
    /// created on demand. An existing file of that name is overwritten.
    /// Returns the path written.
    pub fn create_with_sheet(&self, name: &str, sheet_name: &str) -> Result<PathBuf> {
        let mut workbook = Workbook::new();
        workbook.add_sheet(sheet_name, Table::with_columns([ID_COLUMN])?)?;

        self.config.ensure_root()?;
        let path = self.config.resolve(normalize_workbook_name(name));
        persist::write_workbook(&path, &workbook)?;

        tracing::info!("created {} with sheet '{}'", path.display(), sheet_name);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use sheetbase_xlsx::XlsxReader;

    #[test]
    fn test_create_writes_id_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let creator = Creator::new(StorageConfig::new(dir.path().join("data")));

        let path = creator.create("shop").unwrap();
        assert_eq!(path, dir.path().join("data").join("shop.xlsx"));

        let workbook = XlsxReader::read_file(&path).unwrap();
        assert_eq!(workbook.names().collect::<Vec<_>>(), vec!["Main"]);
        let table = workbook.table("Main").unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["ID"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_create_custom_sheet_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let creator = Creator::new(StorageConfig::new(dir.path()));

        creator.create("book.xlsx").unwrap();
        let path = creator.create_with_sheet("book.xlsx", "Stock").unwrap();

        let workbook = XlsxReader::read_file(&path).unwrap();
        assert_eq!(workbook.names().collect::<Vec<_>>(), vec!["Stock"]);
    }

    #[test]
    fn test_create_rejects_bad_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let creator = Creator::new(StorageConfig::new(dir.path()));

        let err = creator.create_with_sheet("book", "a[1]").unwrap_err();
        assert!(matches!(err, Error::InvalidSheetName(_)));
        assert!(!dir.path().join("book.xlsx").exists());
    }
}

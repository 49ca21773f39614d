//! Loading workbook files into a database

use std::path::{Path, PathBuf};

use sheetbase_xlsx::XlsxReader;

use crate::config::StorageConfig;
use crate::database::Database;
use crate::error::{Error, Result};

/// Reads workbook files from the storage root
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: StorageConfig,
}

impl Loader {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Path of `filename` under the storage root, which must exist
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let path = self.config.resolve(filename);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::FileNotFound { path })
        }
    }

    /// Load `filename` from the storage root
    pub fn load(&self, filename: &str) -> Result<Database> {
        let path = self.resolve(filename)?;
        Self::load_path(&path)
    }

    /// Load a workbook file, binding the database to it
    ///
    /// Every sheet becomes a table, in the order the workbook lists them.
    pub fn load_path(path: &Path) -> Result<Database> {
        let workbook = XlsxReader::read_file(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("loaded {} table(s) from {}", workbook.len(), path.display());
        Ok(Database::from_workbook(workbook, Some(path.to_path_buf())))
    }
}

//! Storage configuration
//!
//! Every workbook file name is resolved against a storage root. The root is
//! an explicit value handed to [`Creator`](crate::Creator),
//! [`Loader`](crate::Loader) and [`Persister`](crate::Persister).

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Storage root used when nothing else is configured
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable that overrides the storage root
pub const DATA_DIR_ENV: &str = "SHEETBASE_DATA_DIR";

/// File extension of workbook files
pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// Where workbook files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Use `root` as the storage directory
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Read the root from `SHEETBASE_DATA_DIR`, falling back to `data`
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    /// The storage directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `filename` onto the storage root
    ///
    /// Pure path arithmetic: nothing is checked on disk.
    pub fn resolve<P: AsRef<Path>>(&self, filename: P) -> PathBuf {
        self.root.join(filename)
    }

    /// Create the storage directory (and parents) if it is missing
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            path: self.root.clone(),
            source,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// Append `.xlsx` to `name` unless it already ends with it (any case)
pub fn normalize_workbook_name(name: &str) -> String {
    let suffix = format!(".{}", WORKBOOK_EXTENSION);
    let has_extension = name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(&suffix);

    if has_extension {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

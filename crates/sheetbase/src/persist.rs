//! Writing databases back to workbook files

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sheetbase_core::Workbook;
use sheetbase_xlsx::{XlsxError, XlsxWriter};

use crate::config::StorageConfig;
use crate::database::Database;
use crate::error::{Error, Result};

/// Saves whole databases, one sheet per table
#[derive(Debug, Clone, Default)]
pub struct Persister {
    config: StorageConfig,
}

impl Persister {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Where a save would write
    ///
    /// An explicit `out` file name is resolved under the storage root;
    /// otherwise the database's backing path is used.
    pub fn target(&self, db: &Database, out: Option<&str>) -> Result<PathBuf> {
        match (out, db.backing_path()) {
            (Some(out), _) => Ok(self.config.resolve(out)),
            (None, Some(path)) => Ok(path.to_path_buf()),
            (None, None) => Err(Error::NoBackingPath),
        }
    }

    /// Write every table of `db`, returning the path written
    ///
    /// The database stays bound to its current backing path even when `out`
    /// names another file.
    pub fn save(&self, db: &Database, out: Option<&str>) -> Result<PathBuf> {
        let path = self.target(db, out)?;
        if out.is_some() {
            self.config.ensure_root()?;
        }
        write_workbook(&path, db.tables())?;
        Ok(path)
    }

    /// Write every table of `db` to `out` and rebind the database to it
    pub fn save_as(&self, db: &mut Database, out: &str) -> Result<PathBuf> {
        let path = self.save(db, Some(out))?;
        db.set_backing_path(path.clone());
        Ok(path)
    }
}

/// Overwrite `path` with `workbook` while holding an exclusive lock on it
///
/// The workbook is checked against the format's limits and the file is
/// opened without truncation, so that neither an unwritable workbook nor a
/// lock held elsewhere destroys existing content.
pub(crate) fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    XlsxWriter::check(workbook).map_err(|source| persistence(path, source))?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| open_error(path, e))?;

    match file.try_lock_exclusive() {
        Ok(()) => {}
        Err(e) if is_contended(&e) => {
            return Err(Error::FileLocked {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(persistence(path, XlsxError::Io(e))),
    }

    write_locked(&file, workbook).map_err(|source| persistence(path, source))?;

    tracing::info!(
        "saved {} table(s) to {}",
        workbook.len(),
        path.display()
    );
    Ok(())
}

/// Truncate the locked file and stream the archive into it
///
/// The lock is released when `file` is closed by the caller.
fn write_locked(mut file: &File, workbook: &Workbook) -> std::result::Result<(), XlsxError> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;

    let mut out = BufWriter::new(file);
    XlsxWriter::write(workbook, &mut out)?;
    out.flush()?;
    file.sync_all()?;
    Ok(())
}

fn persistence(path: &Path, source: XlsxError) -> Error {
    Error::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

/// Classify a failure to open the destination
fn open_error(path: &Path, err: io::Error) -> Error {
    if is_sharing_violation(&err) {
        Error::FileLocked {
            path: path.to_path_buf(),
        }
    } else {
        persistence(path, XlsxError::Io(err))
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Another application holds the file open without sharing it
#[cfg(windows)]
fn is_sharing_violation(err: &io::Error) -> bool {
    const ERROR_SHARING_VIOLATION: i32 = 32;
    const ERROR_LOCK_VIOLATION: i32 = 33;

    err.kind() == io::ErrorKind::PermissionDenied
        || matches!(
            err.raw_os_error(),
            Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION)
        )
}

#[cfg(not(windows))]
fn is_sharing_violation(_err: &io::Error) -> bool {
    false
}

//! The record file on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use packager_core::{
    application::ports::ConfigStore,
    domain::ConfigRecord,
    error::{PackagerError, PackagerResult},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use super::{decode, encode, read_error, write_error};

/// Where the Nix package definition expects the record.
pub const DEFAULT_RECORD_PATH: &str = ".package-config.json";

/// Pre-session contents remembered by the first `stage`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Snapshot {
    Absent,
    Present(Vec<u8>),
}

/// JSON record file with byte-exact rollback and atomic commit.
#[derive(Debug)]
pub struct JsonConfigStore {
    path: PathBuf,
    snapshot: Mutex<Option<Snapshot>>,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Mutex::new(None),
        }
    }

    fn snapshot(&self) -> PackagerResult<MutexGuard<'_, Option<Snapshot>>> {
        self.snapshot.lock().map_err(|_| PackagerError::Internal {
            message: "record snapshot lock poisoned".into(),
        })
    }

    fn read_bytes(&self) -> PackagerResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_error(&self.path, format!("failed to read: {e}")).into()),
        }
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    fn write_atomic(&self, bytes: &[u8]) -> PackagerResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error("create temp file", e))?;
        tmp.write_all(bytes)
            .map_err(|e| self.io_error("write temp file", e))?;
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| self.io_error("copy permissions", e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| self.io_error("sync temp file", e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error("replace", e.error))?;
        Ok(())
    }

    fn io_error(&self, op: &str, e: io::Error) -> PackagerError {
        write_error(&self.path, format!("failed to {op}: {e}")).into()
    }
}

impl ConfigStore for JsonConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PackagerResult<Option<ConfigRecord>> {
        self.read_bytes()?
            .map(|bytes| decode(&self.path, &bytes))
            .transpose()
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn stage(&self, record: &ConfigRecord) -> PackagerResult<()> {
        let mut snapshot = self.snapshot()?;
        if snapshot.is_none() {
            let before = match self.read_bytes()? {
                Some(bytes) => Snapshot::Present(bytes),
                None => Snapshot::Absent,
            };
            debug!(existed = matches!(before, Snapshot::Present(_)), "Snapshot taken");
            *snapshot = Some(before);
        }
        self.write_atomic(&encode(&self.path, record)?)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn discard_staged(&self) -> PackagerResult<()> {
        let mut snapshot = self.snapshot()?;
        match snapshot.take() {
            None => Ok(()),
            Some(Snapshot::Present(bytes)) => {
                debug!("Restoring pre-session contents");
                self.write_atomic(&bytes)
            }
            Some(Snapshot::Absent) => {
                debug!("Removing staged file");
                match fs::remove_file(&self.path) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => {
                        Err(self.io_error("remove", e))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn commit(&self, record: &ConfigRecord) -> PackagerResult<()> {
        let mut snapshot = self.snapshot()?;
        self.write_atomic(&encode(&self.path, record)?)?;
        *snapshot = None;
        info!(package = %record.name, "Record committed");
        Ok(())
    }
}

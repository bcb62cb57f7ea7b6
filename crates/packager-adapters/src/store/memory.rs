//! In-memory record store for testing.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use packager_core::{
    application::ports::ConfigStore,
    domain::ConfigRecord,
    error::{PackagerError, PackagerResult},
};

use super::{DEFAULT_RECORD_PATH, decode, encode};

/// In-memory record file. Clones share the same contents, so a test can
/// hand one clone to a session and inspect the other.
#[derive(Debug, Clone)]
pub struct MemoryConfigStore {
    path: PathBuf,
    inner: Arc<RwLock<MemoryConfigStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryConfigStoreInner {
    bytes: Option<Vec<u8>>,
    snapshot: Option<Option<Vec<u8>>>,
    commits: usize,
}

impl MemoryConfigStore {
    /// Create an empty store (no record file).
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_RECORD_PATH),
            inner: Arc::new(RwLock::new(MemoryConfigStoreInner::default())),
        }
    }

    /// Create a store whose file already holds `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            inner.bytes = Some(bytes.into());
        }
        store
    }

    /// Raw file contents (testing helper).
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.inner.read().ok()?.bytes.clone()
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.inner.read().map(|inner| inner.commits).unwrap_or_default()
    }

    /// Whether a staged write is pending.
    pub fn is_staged(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.snapshot.is_some())
            .unwrap_or_default()
    }

    fn read_lock(&self) -> PackagerResult<RwLockReadGuard<'_, MemoryConfigStoreInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write_lock(&self) -> PackagerResult<RwLockWriteGuard<'_, MemoryConfigStoreInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PackagerResult<Option<ConfigRecord>> {
        let inner = self.read_lock()?;
        inner
            .bytes
            .as_deref()
            .map(|bytes| decode(&self.path, bytes))
            .transpose()
    }

    fn stage(&self, record: &ConfigRecord) -> PackagerResult<()> {
        let encoded = encode(&self.path, record)?;
        let mut inner = self.write_lock()?;
        if inner.snapshot.is_none() {
            inner.snapshot = Some(inner.bytes.clone());
        }
        inner.bytes = Some(encoded);
        Ok(())
    }

    fn discard_staged(&self) -> PackagerResult<()> {
        let mut inner = self.write_lock()?;
        if let Some(previous) = inner.snapshot.take() {
            inner.bytes = previous;
        }
        Ok(())
    }

    fn commit(&self, record: &ConfigRecord) -> PackagerResult<()> {
        let encoded = encode(&self.path, record)?;
        let mut inner = self.write_lock()?;
        inner.bytes = Some(encoded);
        inner.snapshot = None;
        inner.commits += 1;
        Ok(())
    }
}

fn poisoned() -> PackagerError {
    PackagerError::Internal {
        message: "memory store lock poisoned".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_without_stage_is_noop() {
        let store = MemoryConfigStore::with_bytes("{}");
        store.discard_staged().unwrap();
        assert_eq!(store.bytes().as_deref(), Some(&b"{}"[..]));
        assert!(!store.is_staged());
    }

    #[test]
    fn template_record_loads_as_none() {
        let store = MemoryConfigStore::with_bytes(
            r#"{"name":"my-go-service","description":"","owner":"","repo":"","ref":"","sha256":"","vendorHash":""}"#,
        );
        assert!(store.read().unwrap().is_some());
        assert!(store.load("my-go-service").unwrap().is_none());
    }
}

//! Where the persisted snapshot blob lives.
//!
//! The cache doesn't care: it hands [`SnapshotStore`] a named byte blob
//! and asks for it back after a reload. The file store is the production
//! shape; the memory store backs tests and the demo.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Errors from reading or writing a snapshot blob.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the blob failed (beyond "it doesn't exist yet").
    #[error("snapshot read failed: {0}")]
    Read(#[source] io::Error),

    /// Writing the blob failed.
    #[error("snapshot write failed: {0}")]
    Write(#[source] io::Error),
}

/// Persists named byte blobs across application restarts.
///
/// Implementations must treat a missing blob as `Ok(None)`, not an error —
/// a first launch has nothing persisted and that's normal.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Writes (or replaces) the named blob.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Reads the named blob, or `None` if it was never written.
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

// ---------------------------------------------------------------------------
// FileSnapshotStore
// ---------------------------------------------------------------------------

/// A [`SnapshotStore`] writing one JSON file per blob under a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StoreError::Write)?;
        tokio::fs::write(self.path_for(name), bytes)
            .await
            .map_err(StoreError::Write)
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(error) => Err(StoreError::Read(error)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySnapshotStore
// ---------------------------------------------------------------------------

/// A [`SnapshotStore`] in process memory, shareable across cache
/// instances so tests can simulate a reload.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    blobs: HashMap<String, Vec<u8>>,
    reject_writes: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail. Persistence is best-effort, so
    /// the cache must shrug this off.
    pub async fn reject_writes(&self, reject: bool) {
        self.inner.lock().await.reject_writes = reject;
    }

    /// Returns a copy of the named blob, for assertions.
    pub async fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.blobs.get(name).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.reject_writes {
            return Err(StoreError::Write(io::Error::other(
                "writes rejected",
            )));
        }
        inner.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().await.blobs.get(name).cloned())
    }
}

// =========================================================================
// Tests
// =========================================================================

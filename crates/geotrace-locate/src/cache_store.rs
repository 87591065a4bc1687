//! Where the location cache lives between runs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

/// Byte-level storage for the serialized cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> std::io::Result<Option<Vec<u8>>>;

    /// Replaces the stored contents. A failed write must leave the previous contents intact.
    async fn store(&self, bytes: &[u8]) -> std::io::Result<()>;

    /// Human-readable location for log and error messages.
    fn describe(&self) -> String;
}

/// Cache file on local disk, replaced atomically on every store.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "cache".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(&self) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, bytes: &[u8]) -> std::io::Result<()> {
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, handy for tests and for runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    contents: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(bytes.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the stored bytes.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    async fn store(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| std::io::Error::other("memory cache store lock poisoned"))?;
        *guard = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

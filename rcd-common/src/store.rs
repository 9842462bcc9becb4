//! Artifact store abstraction
//!
//! The services only need two operations from blob storage: fetch the bytes
//! at a path and write bytes to a path. [`LocalStore`] backs both with a
//! directory tree; [`MemoryStore`] keeps everything in memory for tests and
//! dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Fetch the full content stored at `path`.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Store `bytes` at `path`, replacing existing content.
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<()>;
}

/// Store rooted at a local directory
///
/// Paths are relative keys; absolute paths and `..` components are rejected
/// so a key can never leave the root.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(Error::InvalidInput(format!("Invalid artifact path: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        debug!("Downloading {}", full.display());
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn upload(&self, bytes: &[u8], path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Uploading {} bytes to {}", bytes.len(), full.display());
        tokio::fs::write(&full, bytes).await?;
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn upload(&self, bytes: &[u8], path: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_store_roundtrip_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        store.upload(b"{}", "tenant/device/file.json").await.unwrap();
        let bytes = store.download("tenant/device/file.json").await.unwrap();

        assert_eq!(bytes, b"{}");
        assert!(dir.path().join("tenant/device/file.json").exists());
    }

    #[tokio::test]
    async fn test_local_store_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store.download("nope.json").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        for bad in ["", "../outside.json", "/etc/passwd", "a/../../b"] {
            let err = store.upload(b"x", bad).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.download("a").await.is_err());

        store.upload(b"abc", "a").await.unwrap();
        assert!(store.contains("a").await);
        assert_eq!(store.download("a").await.unwrap(), b"abc");
    }
}

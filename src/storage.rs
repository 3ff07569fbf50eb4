//! Artifact persistence. The store writes each upload to the configured
//! directory, creating it on first use. Writes are not transactional: a
//! crash mid-write leaves a partial file, which the deployment script is
//! expected to fail loudly on.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::StorageError;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the payload to `<root>/<artifact_name>`, overwriting any
    /// existing file of the same name. Last write wins.
    pub async fn store(
        &self,
        artifact_name: &str,
        payload: &[u8],
    ) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.root.display().to_string(),
                source,
            })?;

        let target = self.root.join(artifact_name);
        tokio::fs::write(&target, payload)
            .await
            .map_err(|source| StorageError::Write {
                path: target.display().to_string(),
                source,
            })?;

        info!(
            path = %target.display(),
            bytes = payload.len(),
            "Artifact stored"
        );

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_store_writes_payload() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));

        let path = store.store("app-1.2.0.jar", b"payload-bytes").await.unwrap();

        assert_eq!(path, dir.path().join("artifacts").join("app-1.2.0.jar"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"payload-bytes");
    }

    #[tokio::test]
    async fn test_store_creates_missing_intermediate_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let store = ArtifactStore::new(&nested);

        store.store("app.jar", b"x").await.unwrap();
        assert!(nested.join("app.jar").exists());
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_artifact() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.store("app.jar", b"first").await.unwrap();
        let path = store.store("app.jar", b"second").await.unwrap();

        // Last write wins; the second payload is readable back
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_reports_unwritable_root() {
        // A root nested under a regular file cannot be created
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, b"file").await.unwrap();

        let store = ArtifactStore::new(blocker.join("artifacts"));
        match store.store("app.jar", b"x").await {
            Err(StorageError::CreateDir { .. }) => {}
            other => panic!("Expected CreateDir error, got {:?}", other),
        }
    }
}

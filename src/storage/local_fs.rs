//! Local file system backend.
//!
//! This module provides an implementation of the StorageBackend trait that
//! stores each namespace's payload in a single file under a base directory.
//! Writes go through a temporary file and a rename, so a crash mid-write
//! never corrupts the previous payload.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::LocalFileSystemConfig;
use crate::storage::backend::{StorageBackend, StorageError};

/// File-per-namespace backend rooted at a base directory
pub struct LocalFileSystemBackend {
    /// Configuration for the local file system backend
    config: LocalFileSystemConfig,
}

impl LocalFileSystemBackend {
    /// Create a new instance with the given configuration
    pub fn new(config: LocalFileSystemConfig) -> Self {
        Self { config }
    }

    /// Get the file path for a namespace
    fn file_path(&self, namespace: &str) -> PathBuf {
        let sanitized = Self::sanitize_namespace(namespace);
        let filename = format!("{}.{}", sanitized, self.config.file_extension);
        PathBuf::from(&self.config.base_dir).join(filename)
    }

    /// Replace characters that are problematic in file paths
    fn sanitize_namespace(namespace: &str) -> String {
        namespace.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
    }

    async fn ensure_base_dir_exists(&self) -> Result<(), StorageError> {
        let path = Path::new(&self.config.base_dir);
        if !path.exists() {
            fs::create_dir_all(path).await.map_err(|e| {
                StorageError::InvalidPath(format!("Failed to create directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Write data to a file atomically via a sibling temp file and rename
    async fn write_atomically(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let dir = path.parent().ok_or_else(|| {
            StorageError::InvalidPath("Invalid path: no parent directory".to_string())
        })?;

        fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::InvalidPath(format!("Failed to create directory: {}", e)))?;

        // The temp file must live in the same directory for the rename to
        // stay on one filesystem.
        let temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            StorageError::StorageError(format!("Failed to create temporary file: {}", e))
        })?;
        let temp_path = temp_file.path().to_path_buf();

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to create file: {}", e)))?;

        file.write_all(data)
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to write to file: {}", e)))?;

        file.flush()
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to flush file: {}", e)))?;

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to rename file: {}", e)))?;

        Ok(())
    }
}

impl Clone for LocalFileSystemBackend {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalFileSystemBackend {
    fn clone_backend(&self) -> Box<dyn StorageBackend> {
        Box::new(self.clone())
    }

    async fn load(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.ensure_base_dir_exists().await?;

        let path = self.file_path(namespace);
        if !path.exists() {
            return Ok(None);
        }

        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| StorageError::FileNotFound(format!("Failed to open file: {}", e)))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to read file: {}", e)))?;

        Ok(Some(contents))
    }

    async fn save(&self, namespace: &str, data: &[u8]) -> Result<(), StorageError> {
        self.ensure_base_dir_exists().await?;
        self.write_atomically(&self.file_path(namespace), data).await
    }

    async fn erase(&self, namespace: &str) -> Result<(), StorageError> {
        let path = self.file_path(namespace);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::StorageError(format!("Failed to remove file: {}", e)))
    }

    async fn is_available(&self) -> bool {
        if self.ensure_base_dir_exists().await.is_ok() {
            let test_path = Path::new(&self.config.base_dir).join("test_availability.tmp");
            if self.write_atomically(&test_path, b"test").await.is_ok() {
                let _ = fs::remove_file(&test_path).await;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_backend() -> (LocalFileSystemBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = LocalFileSystemConfig {
            base_dir: temp_dir.path().to_string_lossy().to_string(),
            file_extension: "json".to_string(),
        };
        (LocalFileSystemBackend::new(config), temp_dir)
    }

    #[tokio::test]
    async fn test_load_missing_namespace_is_none() {
        let (backend, _temp_dir) = create_test_backend().await;
        assert_eq!(backend.load("memories").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (backend, _temp_dir) = create_test_backend().await;

        backend.save("memories", b"payload-1").await.unwrap();
        assert_eq!(
            backend.load("memories").await.unwrap(),
            Some(b"payload-1".to_vec())
        );

        // Overwrite wins.
        backend.save("memories", b"payload-2").await.unwrap();
        assert_eq!(
            backend.load("memories").await.unwrap(),
            Some(b"payload-2".to_vec())
        );
    }

    #[tokio::test]
    async fn test_erase() {
        let (backend, _temp_dir) = create_test_backend().await;

        backend.save("memories", b"payload").await.unwrap();
        backend.erase("memories").await.unwrap();
        assert_eq!(backend.load("memories").await.unwrap(), None);

        // Erasing again is a no-op, not an error.
        backend.erase("memories").await.unwrap();
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let (backend, _temp_dir) = create_test_backend().await;

        backend.save("first", b"a").await.unwrap();
        backend.save("second", b"b").await.unwrap();

        assert_eq!(backend.load("first").await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(backend.load("second").await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn test_sanitize_namespace() {
        let sanitized =
            LocalFileSystemBackend::sanitize_namespace("test/namespace:with*invalid?chars");
        assert_eq!(sanitized, "test_namespace_with_invalid_chars");
    }

    #[tokio::test]
    async fn test_is_available() {
        let (backend, _temp_dir) = create_test_backend().await;
        assert!(backend.is_available().await);
    }
}

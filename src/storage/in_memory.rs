//! In-memory backend.
//!
//! This module provides an implementation of the StorageBackend trait that
//! keeps payloads in process memory using DashMap for thread-safe concurrent
//! access. Clones share underlying storage, so a background save task and a
//! later reload observe the same state. Data is lost when the process exits;
//! the backend is intended for tests and ephemeral previews.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::storage::backend::{StorageBackend, StorageError};

/// Process-local backend with shared state across clones
#[derive(Default)]
pub struct InMemoryBackend {
    /// Payloads keyed by namespace
    storage: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clone for InMemoryBackend {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    fn clone_backend(&self) -> Box<dyn StorageBackend> {
        Box::new(self.clone())
    }

    async fn load(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.storage.get(namespace).map(|data| data.value().clone()))
    }

    async fn save(&self, namespace: &str, data: &[u8]) -> Result<(), StorageError> {
        self.storage.insert(namespace.to_string(), data.to_vec());
        Ok(())
    }

    async fn erase(&self, namespace: &str) -> Result<(), StorageError> {
        self.storage.remove(namespace);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        true
    }
}

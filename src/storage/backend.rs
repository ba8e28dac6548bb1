//! Storage backend contract.
//!
//! The StorageBackend trait defines the interface the memory record store
//! persists through. The store serializes its full collection into one
//! opaque payload and stores it under a single fixed namespace; backends
//! only ever see bytes, never records.
//!
//! # Key Features
//!
//! - Common interface for different storage backends
//! - Namespace-based payload organization
//! - Asynchronous operations for non-blocking I/O
//! - Error handling with specific error types
//! - Backend availability checking
//!
//! # Usage Example
//!
//! ```no_run
//! use keepsake::storage::StorageBackend;
//!
//! # async fn example<T: StorageBackend>(backend: &T) -> Result<(), Box<dyn std::error::Error>> {
//! // Load the payload, if one exists
//! if let Some(bytes) = backend.load("memories").await? {
//!     println!("{} bytes persisted", bytes.len());
//! }
//!
//! // Save a payload
//! backend.save("memories", b"{}").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Durable store adapter consumed by the memory record store
///
/// # Thread Safety
///
/// All methods are designed to be called concurrently from multiple tasks.
/// Implementations must ensure proper synchronization.
///
/// # Error Handling
///
/// Operations return `Result<T, StorageError>`. A missing payload is not an
/// error: `load` distinguishes "nothing persisted yet" (`Ok(None)`) from a
/// backend failure (`Err`).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Clone this backend behind a fresh box
    ///
    /// Background save tasks take their own handle to the backend;
    /// implementations share underlying state across clones.
    fn clone_backend(&self) -> Box<dyn StorageBackend>;

    /// Load the payload for a namespace
    ///
    /// # Arguments
    /// * `namespace` - The namespace to load from
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` - The persisted payload
    /// * `Ok(None)` - Nothing has been persisted under this namespace
    /// * `Err(StorageError)` - If loading fails
    async fn load(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Save the payload for a namespace, overwriting any previous payload
    ///
    /// # Arguments
    /// * `namespace` - The namespace to save to
    /// * `data` - The payload bytes
    ///
    /// # Returns
    /// * `Ok(())` - If saving succeeds
    /// * `Err(StorageError)` - If saving fails
    async fn save(&self, namespace: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove the persisted payload for a namespace
    ///
    /// Removing a namespace that was never saved is not an error.
    async fn erase(&self, namespace: &str) -> Result<(), StorageError>;

    /// Check if the backend is available
    ///
    /// This method never fails; it returns `false` if the backend cannot be
    /// used for any reason.
    async fn is_available(&self) -> bool;
}

/// Errors that can occur during storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

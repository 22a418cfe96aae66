//! Blob store port - external object storage for uploaded files

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a blob store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Transport failure or timeout talking to the store
    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    /// The store refused the object (size, permissions, ...)
    #[error("blob rejected: {0}")]
    Rejected(String),
}

/// Bytes to upload plus what the client told us about them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    pub bytes: Vec<u8>,
    pub content_type_hint: Option<String>,
    pub original_name: Option<String>,
}

impl BlobUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type_hint: None,
            original_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type_hint = Some(content_type.into());
        self
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A blob that now exists in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Opaque identifier, used for later deletion
    pub object_id: String,
    pub byte_size: i64,
    pub content_type: String,
    pub original_name: Option<String>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a new object
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError>;

    /// Remove an object. Deleting a missing object is not an error.
    async fn delete(&self, object_id: &str) -> Result<(), StorageError>;
}

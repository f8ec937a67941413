use crate::local::LocalBackend;
#[cfg(feature = "s3")]
use crate::s3::S3Backend;
use crate::StorageResult;
use bytes::Bytes;
use imgvault_config::BackendKind;

/// Operations every storage backend supports
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persists `content` under a key derived from `original_name` and the
    /// retention mode in effect at call time; returns the storage key
    async fn save_file(&self, content: Bytes, original_name: &str) -> StorageResult<String>;

    /// Returns a time-limited access URL for a stored key.
    ///
    /// Fails with `NotFound` when nothing is stored under the key for the
    /// current retention mode.
    async fn get_file_url(&self, storage_key: &str) -> StorageResult<String>;

    /// Removes the object stored under `storage_key` for the current retention
    /// mode; `NotFound` when there is none
    async fn delete_file(&self, storage_key: &str) -> StorageResult<()>;

    /// Which backend kind this is
    fn kind(&self) -> BackendKind;
}

/// The live backend handed out by the selector
#[derive(Debug)]
pub enum ActiveBackend {
    Local(LocalBackend),
    #[cfg(feature = "s3")]
    Remote(S3Backend),
}

impl ActiveBackend {
    /// Token verification is a local-only capability; remote URLs are checked by
    /// the object store itself
    pub fn token_verifier(&self) -> Option<&LocalBackend> {
        match self {
            ActiveBackend::Local(local) => Some(local),
            #[cfg(feature = "s3")]
            ActiveBackend::Remote(_) => None,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for ActiveBackend {
    async fn save_file(&self, content: Bytes, original_name: &str) -> StorageResult<String> {
        match self {
            ActiveBackend::Local(local) => local.save_file(content, original_name).await,
            #[cfg(feature = "s3")]
            ActiveBackend::Remote(remote) => remote.save_file(content, original_name).await,
        }
    }

    async fn get_file_url(&self, storage_key: &str) -> StorageResult<String> {
        match self {
            ActiveBackend::Local(local) => local.get_file_url(storage_key).await,
            #[cfg(feature = "s3")]
            ActiveBackend::Remote(remote) => remote.get_file_url(storage_key).await,
        }
    }

    async fn delete_file(&self, storage_key: &str) -> StorageResult<()> {
        match self {
            ActiveBackend::Local(local) => local.delete_file(storage_key).await,
            #[cfg(feature = "s3")]
            ActiveBackend::Remote(remote) => remote.delete_file(storage_key).await,
        }
    }

    fn kind(&self) -> BackendKind {
        match self {
            ActiveBackend::Local(local) => local.kind(),
            #[cfg(feature = "s3")]
            ActiveBackend::Remote(remote) => remote.kind(),
        }
    }
}

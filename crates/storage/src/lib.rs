mod backend;
mod errors;
mod keys;
mod local;
mod selector;
mod token;

#[cfg(feature = "s3")]
mod s3;

pub use backend::{ActiveBackend, StorageBackend};
pub use errors::*;
pub use keys::{storage_key_for, TEMP_FILE_NAME};
pub use local::{LocalBackend, FILE_ROUTE_PREFIX};
pub use selector::BackendSelector;
pub use token::{FileClaims, TokenSigner};

#[cfg(feature = "s3")]
pub use s3::S3Backend;

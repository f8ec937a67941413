use imgvault_config::ConfigError;
use imgvault_utils::UtilsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    /// Message is fixed so nothing about the token or the file leaks to callers
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid storage configuration: {0}")]
    Configuration(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<ConfigError> for StorageError {
    fn from(err: ConfigError) -> Self {
        StorageError::Configuration(err.to_string())
    }
}

impl From<UtilsError> for StorageError {
    fn from(err: UtilsError) -> Self {
        StorageError::InvalidKey(err.to_string())
    }
}

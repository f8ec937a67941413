use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UtilsError {
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Path contains '..' (path traversal attempt)")]
    PathTraversal,

    #[error("Path contains null byte")]
    NullByte,

    #[error("Absolute paths are not allowed")]
    AbsolutePath,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown storage backend: '{0}' (expected \"local\" or \"remote\")")]
    UnknownBackend(String),

    #[error("Unknown retention mode: '{0}' (expected \"permanent\" or \"temporary\")")]
    UnknownRetention(String),
}

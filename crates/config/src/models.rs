use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerSettings,
    #[serde(default = "super::defaults::security_settings")]
    pub security: SecuritySettings,
    #[serde(default = "super::defaults::storage_settings")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    #[serde(default = "super::defaults::tcp_nodelay")]
    pub tcp_nodelay: bool,
    #[serde(default = "super::defaults::timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "super::defaults::max_body_size")]
    pub max_body_size_mb: usize,
    #[serde(default = "super::defaults::allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "super::defaults::max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "super::defaults::streaming_threshold_mb")]
    pub streaming_threshold_mb: u64,
    #[serde(default = "super::defaults::enable_compression")]
    pub enable_compression: bool,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct SecuritySettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "super::defaults::signing_secret")]
    pub signing_secret: String,
}

impl fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("api_key", &"[hidden]")
            .field("signing_secret", &"[hidden]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "super::defaults::storage_backend")]
    pub backend: BackendKind,
    #[serde(default = "super::defaults::retention")]
    pub retention: RetentionMode,
    #[serde(default = "super::defaults::url_expiration_secs")]
    pub url_expiration_secs: u64,
    #[serde(default = "super::defaults::timestamp_prefix")]
    pub timestamp_prefix: bool,
    #[serde(default = "super::defaults::local_settings")]
    pub local: LocalSettings,
    #[serde(default = "super::defaults::s3_settings")]
    pub s3: S3Settings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalSettings {
    #[serde(default = "super::defaults::permanent_dir")]
    pub permanent_dir: String,
    #[serde(default = "super::defaults::temp_dir")]
    pub temp_dir: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct S3Settings {
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "super::defaults::s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub bucket_name: String,
    #[serde(default = "super::defaults::permanent_prefix")]
    pub permanent_prefix: String,
    #[serde(default = "super::defaults::temp_prefix")]
    pub temp_prefix: String,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[hidden]")
            .field("bucket_name", &self.bucket_name)
            .field("permanent_prefix", &self.permanent_prefix)
            .field("temp_prefix", &self.temp_prefix)
            .finish()
    }
}

impl S3Settings {
    /// Checks the fields a remote client cannot be built without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "storage.s3.bucket_name is required for the remote backend".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "storage.s3.region is required for the remote backend".to_string(),
            ));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "storage.s3 credentials are required for the remote backend".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which storage medium serves uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    #[serde(alias = "s3", alias = "oss")]
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" | "s3" | "oss" => Ok(BackendKind::Remote),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Whether uploads go to the single overwritable slot or are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionMode {
    Permanent,
    Temporary,
}

impl RetentionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionMode::Permanent => "permanent",
            RetentionMode::Temporary => "temporary",
        }
    }
}

impl From<bool> for RetentionMode {
    fn from(temporary: bool) -> Self {
        if temporary {
            RetentionMode::Temporary
        } else {
            RetentionMode::Permanent
        }
    }
}

impl fmt::Display for RetentionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetentionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Ok(RetentionMode::Permanent),
            "temporary" | "temp" => Ok(RetentionMode::Temporary),
            other => Err(ConfigError::UnknownRetention(other.to_string())),
        }
    }
}

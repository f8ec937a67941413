use crate::backend::StorageBackend;
use crate::keys::storage_key_for;
use crate::{StorageError, StorageResult};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;
use imgvault_config::{BackendKind, ConfigState, RetentionMode, S3Settings};
use imgvault_utils::validate_file_name;
use std::sync::Arc;
use std::time::Duration;

/// S3-compatible storage backend
/// Compatible with: Cloudflare R2, AWS S3, MinIO, Aliyun OSS, etc.
pub struct S3Backend {
    client: Client,
    bucket_name: String,
    permanent_prefix: String,
    temp_prefix: String,
    settings: Arc<ConfigState>,
    timestamp_prefix: bool,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket_name", &self.bucket_name)
            .field("permanent_prefix", &self.permanent_prefix)
            .field("temp_prefix", &self.temp_prefix)
            .finish()
    }
}

impl S3Backend {
    pub async fn new(
        s3: &S3Settings,
        settings: Arc<ConfigState>,
        timestamp_prefix: bool,
    ) -> StorageResult<Self> {
        s3.validate()?;

        let credentials = Credentials::new(
            s3.access_key_id.clone(),
            s3.secret_access_key.clone(),
            None,
            None,
            "imgvault-s3",
        );

        // Failed calls surface to the caller as-is
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(s3.region.clone()))
            .retry_config(RetryConfig::disabled());

        let custom_endpoint = !s3.endpoint_url.trim().is_empty();
        if custom_endpoint {
            loader = loader.endpoint_url(s3.endpoint_url.trim());
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(custom_endpoint)
            .build();

        tracing::debug!(
            bucket = %s3.bucket_name,
            region = %s3.region,
            endpoint = %s3.endpoint_url,
            "Remote storage backend ready"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket_name: s3.bucket_name.clone(),
            permanent_prefix: s3.permanent_prefix.clone(),
            temp_prefix: s3.temp_prefix.clone(),
            settings,
            timestamp_prefix,
        })
    }

    fn build_key(&self, mode: RetentionMode, storage_key: &str) -> String {
        let prefix = match mode {
            RetentionMode::Permanent => &self.permanent_prefix,
            RetentionMode::Temporary => &self.temp_prefix,
        };
        object_key(prefix, storage_key)
    }

    /// Resolves `storage_key` under the current retention prefix and checks the
    /// object exists
    async fn existing_object(&self, storage_key: &str) -> StorageResult<String> {
        validate_file_name(storage_key)?;
        let key = self.build_key(self.settings.retention_mode(), storage_key);

        if let Err(e) = self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
        {
            let missing = e
                .as_service_error()
                .is_some_and(|service| service.is_not_found());
            if missing {
                tracing::debug!(bucket = %self.bucket_name, key = %key, "Requested object does not exist");
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            tracing::error!(error = %e, bucket = %self.bucket_name, key = %key, "S3 head object failed");
            return Err(StorageError::Backend(format!(
                "Failed to look up '{}': {}",
                key, e
            )));
        }

        Ok(key)
    }
}

/// Joins a key prefix and a storage key into an object key
fn object_key(prefix: &str, storage_key: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{}{}", prefix, storage_key)
    } else {
        format!("{}/{}", prefix, storage_key)
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    async fn save_file(&self, content: Bytes, original_name: &str) -> StorageResult<String> {
        let mode = self.settings.retention_mode();
        let storage_key = storage_key_for(mode, original_name, self.timestamp_prefix)?;
        let key = self.build_key(mode, &storage_key);
        let content_type = mime_guess::from_path(&storage_key)
            .first_or_octet_stream()
            .to_string();
        let size = content.len();
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket_name,
                    key = %key,
                    "S3 upload failed"
                );
                StorageError::Backend(format!("Failed to upload '{}': {}", key, e))
            })?;

        tracing::info!(
            bucket = %self.bucket_name,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(storage_key)
    }

    async fn get_file_url(&self, storage_key: &str) -> StorageResult<String> {
        let key = self.existing_object(storage_key).await?;

        let expires_in = Duration::from_secs(self.settings.url_expiration_seconds());
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Configuration(format!("Invalid URL expiration: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to presign '{}': {}", key, e)))?;

        Ok(request.uri().to_string())
    }

    async fn delete_file(&self, storage_key: &str) -> StorageResult<()> {
        // DeleteObject succeeds for absent keys, so look first
        let key = self.existing_object(storage_key).await?;

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket_name,
                    key = %key,
                    "S3 delete failed"
                );
                StorageError::Backend(format!("Failed to delete '{}': {}", key, e))
            })?;

        tracing::info!(bucket = %self.bucket_name, key = %key, "S3 delete successful");
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }
}

use crate::backend::StorageBackend;
use crate::keys::storage_key_for;
use crate::token::TokenSigner;
use crate::{StorageError, StorageResult};
use bytes::Bytes;
use imgvault_config::{BackendKind, ConfigState, LocalSettings, RetentionMode};
use imgvault_filesystem::FileSystem;
use imgvault_utils::validate_file_name;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Route prefix under which signed local files are served
pub const FILE_ROUTE_PREFIX: &str = "/api/file";

/// Local filesystem storage backend.
///
/// Files live under a permanent and a temporary root. Access URLs carry a signed
/// token embedding the absolute path, so verification needs no server-side index.
#[derive(Debug)]
pub struct LocalBackend {
    permanent_dir: PathBuf,
    temp_dir: PathBuf,
    signer: TokenSigner,
    settings: Arc<ConfigState>,
    timestamp_prefix: bool,
}

impl LocalBackend {
    /// Creates both storage roots (idempotently) and binds the backend to them
    pub async fn new(
        local: &LocalSettings,
        signer: TokenSigner,
        settings: Arc<ConfigState>,
        timestamp_prefix: bool,
    ) -> StorageResult<Self> {
        let (permanent_dir, temp_dir) =
            FileSystem::ensure_storage_structure(&local.permanent_dir, &local.temp_dir)
                .await
                .map_err(|e| {
                    StorageError::Backend(format!("Failed to create storage directories: {}", e))
                })?;

        tracing::debug!(
            permanent = %permanent_dir.display(),
            temp = %temp_dir.display(),
            "Local storage backend ready"
        );

        Ok(Self {
            permanent_dir,
            temp_dir,
            signer,
            settings,
            timestamp_prefix,
        })
    }

    pub fn permanent_dir(&self) -> &Path {
        &self.permanent_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn dir_for(&self, mode: RetentionMode) -> &Path {
        match mode {
            RetentionMode::Permanent => &self.permanent_dir,
            RetentionMode::Temporary => &self.temp_dir,
        }
    }

    fn resolve(&self, storage_key: &str, mode: RetentionMode) -> StorageResult<PathBuf> {
        validate_file_name(storage_key)?;
        Ok(self.dir_for(mode).join(storage_key))
    }

    /// Resolves `storage_key` and checks a regular file is stored there.
    ///
    /// Only a missing entry (or a non-file) is `NotFound`; other I/O failures
    /// surface as `Backend`.
    async fn existing_file(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let mode = self.settings.retention_mode();
        let path = self.resolve(storage_key, mode)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => {
                tracing::debug!(key = %storage_key, retention = %mode, "Requested key is not a file");
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %storage_key, retention = %mode, "Requested file does not exist");
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, key = %storage_key, retention = %mode, "Local storage lookup failed");
                Err(StorageError::Backend(format!(
                    "Failed to look up '{}': {}",
                    storage_key, e
                )))
            }
        }
    }

    /// Checks a token and returns the file path it grants access to.
    ///
    /// Paths outside this backend's roots are refused even when the signature is
    /// valid. Every failure is reported as the same `InvalidToken`.
    pub fn verify_token(&self, token: &str) -> StorageResult<PathBuf> {
        let claims = self.signer.verify(token)?;
        let path = PathBuf::from(claims.path);

        let inside_roots = path.parent().is_some_and(|parent| {
            parent == self.permanent_dir.as_path() || parent == self.temp_dir.as_path()
        });
        if !inside_roots {
            tracing::warn!("Rejected file token pointing outside the storage roots");
            return Err(StorageError::InvalidToken);
        }

        Ok(path)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalBackend {
    async fn save_file(&self, content: Bytes, original_name: &str) -> StorageResult<String> {
        let mode = self.settings.retention_mode();
        let key = storage_key_for(mode, original_name, self.timestamp_prefix)?;
        let path = self.dir_for(mode).join(&key);
        let size = content.len();
        let start = std::time::Instant::now();

        FileSystem::write_atomic(&path, &content).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %key,
                retention = %mode,
                "Local storage write failed"
            );
            StorageError::Backend(format!("Failed to write '{}': {}", key, e))
        })?;

        tracing::info!(
            key = %key,
            retention = %mode,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(key)
    }

    async fn get_file_url(&self, storage_key: &str) -> StorageResult<String> {
        let path = self.existing_file(storage_key).await?;

        let token = self
            .signer
            .sign(&path, self.settings.url_expiration_seconds())?;

        Ok(format!("{}/{}", FILE_ROUTE_PREFIX, token))
    }

    async fn delete_file(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.existing_file(storage_key).await?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, "Local storage delete successful");
                Ok(())
            }
            // Lost a race with another delete
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, key = %storage_key, "Local storage delete failed");
                Err(StorageError::Backend(format!(
                    "Failed to delete '{}': {}",
                    storage_key, e
                )))
            }
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::FileClaims;
    use imgvault_config::{RuntimeSettings, SettingsUpdate};
    use tempfile::{tempdir, TempDir};

    const SECRET: &str = "local-backend-test-secret";

    async fn backend(timestamp_prefix: bool) -> (TempDir, Arc<ConfigState>, LocalBackend) {
        let dir = tempdir().unwrap();
        let local = LocalSettings {
            permanent_dir: dir.path().join("permanent").to_string_lossy().to_string(),
            temp_dir: dir.path().join("temp").to_string_lossy().to_string(),
        };
        let settings = ConfigState::new(RuntimeSettings {
            backend_kind: BackendKind::Local,
            retention_mode: RetentionMode::Permanent,
            url_expiration_seconds: 3600,
        });
        let backend = LocalBackend::new(
            &local,
            TokenSigner::new(SECRET),
            Arc::clone(&settings),
            timestamp_prefix,
        )
        .await
        .unwrap();
        (dir, settings, backend)
    }

    fn token_of(url: &str) -> &str {
        url.strip_prefix("/api/file/").unwrap()
    }

    #[tokio::test]
    async fn new_creates_both_roots() {
        let (_dir, _settings, backend) = backend(true).await;
        assert!(backend.permanent_dir().is_dir());
        assert!(backend.temp_dir().is_dir());
        assert!(backend.permanent_dir().is_absolute());
    }

    #[tokio::test]
    async fn save_then_url_then_verify_returns_original_bytes() {
        let (_dir, _settings, backend) = backend(false).await;
        let content = Bytes::from_static(b"\xff\xd8abc");

        let key = backend.save_file(content.clone(), "a.jpg").await.unwrap();
        assert_eq!(key, "a.jpg");

        let url = backend.get_file_url(&key).await.unwrap();
        let path = backend.verify_token(token_of(&url)).unwrap();

        assert!(path.ends_with("a.jpg"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), content.to_vec());
    }

    #[tokio::test]
    async fn permanent_keys_are_time_prefixed_by_default() {
        let (_dir, _settings, backend) = backend(true).await;

        let key = backend.save_file(Bytes::from_static(b"12345"), "a.jpg").await.unwrap();

        assert!(key.ends_with("-a.jpg"));
        assert!(backend.permanent_dir().join(&key).is_file());
    }

    #[tokio::test]
    async fn temporary_uploads_supersede_each_other() {
        let (_dir, settings, backend) = backend(true).await;
        settings.update(SettingsUpdate::retention(RetentionMode::Temporary));

        let first = backend.save_file(Bytes::from_static(b"first"), "one.jpg").await.unwrap();
        let second = backend.save_file(Bytes::from_static(b"second"), "two.jpg").await.unwrap();

        assert_eq!(first, "temp.jpg");
        assert_eq!(second, "temp.jpg");
        let url = backend.get_file_url("temp.jpg").await.unwrap();
        let path = backend.verify_token(token_of(&url)).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
        assert!(path.starts_with(backend.temp_dir()));
    }

    #[tokio::test]
    async fn retention_switch_keeps_permanent_files_reachable() {
        let (_dir, settings, backend) = backend(false).await;

        let key = backend.save_file(Bytes::from_static(b"keep"), "keep.jpg").await.unwrap();

        settings.update(SettingsUpdate::retention(RetentionMode::Temporary));
        backend.save_file(Bytes::from_static(b"tmp"), "x.jpg").await.unwrap();
        assert!(matches!(
            backend.get_file_url(&key).await,
            Err(StorageError::NotFound(_))
        ));

        settings.update(SettingsUpdate::retention(RetentionMode::Permanent));
        let url = backend.get_file_url(&key).await.unwrap();
        let path = backend.verify_token(token_of(&url)).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"keep");
    }

    #[tokio::test]
    async fn url_for_unknown_key_is_not_found() {
        let (_dir, _settings, backend) = backend(true).await;

        assert!(matches!(
            backend.get_file_url("never-saved.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn directory_under_a_key_is_not_found() {
        let (_dir, _settings, backend) = backend(true).await;
        tokio::fs::create_dir(backend.permanent_dir().join("album.jpg")).await.unwrap();

        assert!(matches!(
            backend.get_file_url("album.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lookup_failures_other_than_missing_are_backend_errors() {
        let (_dir, _settings, backend) = backend(true).await;

        // Longer than any file name the OS accepts
        let key = "a".repeat(300);

        assert!(matches!(
            backend.get_file_url(&key).await,
            Err(StorageError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn dot_only_names_are_invalid_keys() {
        let (_dir, _settings, backend) = backend(false).await;

        for name in [".", "...."] {
            assert!(matches!(
                backend.save_file(Bytes::from_static(b"x"), name).await,
                Err(StorageError::InvalidKey(_))
            ));
        }
        assert!(matches!(
            backend.get_file_url(".").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(backend.permanent_dir().is_dir());
    }

    #[tokio::test]
    async fn delete_removes_the_file_for_the_current_mode() {
        let (_dir, settings, backend) = backend(false).await;
        backend.save_file(Bytes::from_static(b"bye"), "a.jpg").await.unwrap();

        settings.update(SettingsUpdate::retention(RetentionMode::Temporary));
        assert!(matches!(
            backend.delete_file("a.jpg").await,
            Err(StorageError::NotFound(_))
        ));

        settings.update(SettingsUpdate::retention(RetentionMode::Permanent));
        backend.delete_file("a.jpg").await.unwrap();

        assert!(!backend.permanent_dir().join("a.jpg").exists());
        assert!(matches!(
            backend.get_file_url("a.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_of_unknown_key_is_not_found() {
        let (_dir, _settings, backend) = backend(true).await;

        assert!(matches!(
            backend.delete_file("never-saved.jpg").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            backend.delete_file("../temp/temp.jpg").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, _settings, backend) = backend(true).await;

        assert!(matches!(
            backend.get_file_url("../temp/temp.jpg").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn url_expiry_follows_runtime_setting() {
        let (_dir, settings, backend) = backend(false).await;
        settings.update(SettingsUpdate::url_expiration(5));
        backend.save_file(Bytes::from_static(b"x"), "a.jpg").await.unwrap();

        let url = backend.get_file_url("a.jpg").await.unwrap();
        let claims = TokenSigner::new(SECRET)
            .verify(token_of(&url))
            .unwrap();

        let now = chrono::Utc::now().timestamp();
        assert!(claims.exp <= now + 5 && claims.exp >= now + 4);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_generic_error() {
        let (_dir, _settings, backend) = backend(false).await;
        backend.save_file(Bytes::from_static(b"x"), "a.jpg").await.unwrap();

        let expired = TokenSigner::new(SECRET)
            .sign_claims(&FileClaims {
                path: imgvault_utils::normalize_path(&backend.permanent_dir().join("a.jpg")),
                exp: chrono::Utc::now().timestamp() - 1,
            })
            .unwrap();

        let err = backend.verify_token(&expired).unwrap_err();
        assert!(matches!(err, StorageError::InvalidToken));
        assert_eq!(err.to_string(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn signed_token_outside_roots_is_rejected() {
        let (_dir, _settings, backend) = backend(false).await;

        let forged = TokenSigner::new(SECRET)
            .sign_claims(&FileClaims {
                path: "/etc/passwd".to_string(),
                exp: chrono::Utc::now().timestamp() + 60,
            })
            .unwrap();

        assert!(matches!(backend.verify_token(&forged), Err(StorageError::InvalidToken)));
    }

    #[tokio::test]
    async fn concurrent_temporary_writes_leave_one_complete_file() {
        let (_dir, settings, backend) = backend(true).await;
        settings.update(SettingsUpdate::retention(RetentionMode::Temporary));
        let backend = Arc::new(backend);

        let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 4096]).collect();
        let mut handles = Vec::new();
        for payload in payloads.clone() {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                backend.save_file(Bytes::from(payload), "x.jpg").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = tokio::fs::read(backend.temp_dir().join("temp.jpg")).await.unwrap();
        assert!(payloads.contains(&stored));
    }
}

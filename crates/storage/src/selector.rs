use crate::backend::ActiveBackend;
use crate::local::LocalBackend;
use crate::token::TokenSigner;
use crate::StorageResult;
use imgvault_config::{BackendKind, ConfigState, SettingsUpdate, StorageSettings};
use std::sync::Arc;
use tokio::sync::Mutex;

struct CachedBackend {
    kind: BackendKind,
    backend: Arc<ActiveBackend>,
}

/// Hands out the backend matching the configured kind.
///
/// The backend is built on first use and rebuilt whenever the configured kind
/// no longer matches the cached one. Callers get an `Arc` snapshot, so a request
/// keeps the backend it started with even if the selector swaps it meanwhile.
pub struct BackendSelector {
    settings: Arc<ConfigState>,
    storage: StorageSettings,
    signer: TokenSigner,
    cached: Mutex<Option<CachedBackend>>,
}

impl BackendSelector {
    pub fn new(settings: Arc<ConfigState>, storage: StorageSettings, signing_secret: &str) -> Self {
        Self {
            settings,
            storage,
            signer: TokenSigner::new(signing_secret),
            cached: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Arc<ConfigState> {
        &self.settings
    }

    /// Returns the backend for the currently configured kind
    pub async fn get_instance(&self) -> StorageResult<Arc<ActiveBackend>> {
        let kind = self.settings.backend_kind();
        let mut cached = self.cached.lock().await;

        if let Some(current) = cached.as_ref() {
            if current.kind == kind {
                return Ok(Arc::clone(&current.backend));
            }
        }

        let backend = Arc::new(self.build(kind).await?);
        tracing::info!(backend = %kind, "Storage backend initialized");
        *cached = Some(CachedBackend {
            kind,
            backend: Arc::clone(&backend),
        });

        Ok(backend)
    }

    /// Rebuilds the backend for `kind`, even when it is already active, and
    /// records `kind` as the configured backend.
    ///
    /// When construction fails nothing changes: the previous backend stays
    /// cached and the configured kind is left as it was.
    pub async fn set_strategy(&self, kind: BackendKind) -> StorageResult<Arc<ActiveBackend>> {
        let mut cached = self.cached.lock().await;

        let backend = Arc::new(self.build(kind).await.map_err(|e| {
            tracing::warn!(backend = %kind, error = %e, "Storage backend switch rejected");
            e
        })?);

        self.settings.update(SettingsUpdate::backend(kind));
        *cached = Some(CachedBackend {
            kind,
            backend: Arc::clone(&backend),
        });
        tracing::info!(backend = %kind, "Storage backend switched");

        Ok(backend)
    }

    /// [`set_strategy`](Self::set_strategy) for a kind given by name
    pub async fn set_strategy_named(&self, name: &str) -> StorageResult<Arc<ActiveBackend>> {
        let kind = name.parse::<BackendKind>()?;
        self.set_strategy(kind).await
    }

    /// Kind of the cached backend, if one has been built
    pub async fn cached_kind(&self) -> Option<BackendKind> {
        self.cached.lock().await.as_ref().map(|current| current.kind)
    }

    async fn build(&self, kind: BackendKind) -> StorageResult<ActiveBackend> {
        match kind {
            BackendKind::Local => {
                let local = LocalBackend::new(
                    &self.storage.local,
                    self.signer.clone(),
                    Arc::clone(&self.settings),
                    self.storage.timestamp_prefix,
                )
                .await?;
                Ok(ActiveBackend::Local(local))
            }
            BackendKind::Remote => self.build_remote().await,
        }
    }

    #[cfg(feature = "s3")]
    async fn build_remote(&self) -> StorageResult<ActiveBackend> {
        let remote = crate::s3::S3Backend::new(
            &self.storage.s3,
            Arc::clone(&self.settings),
            self.storage.timestamp_prefix,
        )
        .await?;
        Ok(ActiveBackend::Remote(remote))
    }

    #[cfg(not(feature = "s3"))]
    async fn build_remote(&self) -> StorageResult<ActiveBackend> {
        self.storage.s3.validate()?;
        Err(crate::StorageError::Configuration(
            "remote backend support is not compiled in (enable the `s3` feature)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StorageBackend, StorageError};
    use bytes::Bytes;
    use imgvault_config::{LocalSettings, RetentionMode, RuntimeSettings, S3Settings};
    use tempfile::{tempdir, TempDir};

    fn storage_settings(dir: &TempDir, s3: S3Settings) -> StorageSettings {
        StorageSettings {
            backend: BackendKind::Local,
            retention: RetentionMode::Permanent,
            url_expiration_secs: 3600,
            timestamp_prefix: false,
            local: LocalSettings {
                permanent_dir: dir.path().join("permanent").to_string_lossy().to_string(),
                temp_dir: dir.path().join("temp").to_string_lossy().to_string(),
            },
            s3,
        }
    }

    fn empty_s3() -> S3Settings {
        S3Settings {
            endpoint_url: String::new(),
            region: "us-east-1".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: String::new(),
            permanent_prefix: "permanent/".to_string(),
            temp_prefix: "temp/".to_string(),
        }
    }

    fn selector(dir: &TempDir, s3: S3Settings) -> BackendSelector {
        let storage = storage_settings(dir, s3);
        let settings = ConfigState::from_storage(&storage);
        BackendSelector::new(settings, storage, "selector-test-secret")
    }

    #[tokio::test]
    async fn instance_is_built_lazily_and_reused() {
        let dir = tempdir().unwrap();
        let selector = selector(&dir, empty_s3());
        assert_eq!(selector.cached_kind().await, None);

        let first = selector.get_instance().await.unwrap();
        let second = selector.get_instance().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.kind(), BackendKind::Local);
        assert_eq!(selector.cached_kind().await, Some(BackendKind::Local));
    }

    #[tokio::test]
    async fn set_strategy_rebuilds_even_for_the_same_kind() {
        let dir = tempdir().unwrap();
        let selector = selector(&dir, empty_s3());
        let before = selector.get_instance().await.unwrap();

        selector.set_strategy(BackendKind::Local).await.unwrap();
        let after = selector.get_instance().await.unwrap();

        assert!(!Arc::ptr_eq(&before, &after));

        // The replaced instance still serves the request that holds it
        let key = before.save_file(Bytes::from_static(b"12345"), "a.jpg").await.unwrap();
        assert!(after.get_file_url(&key).await.is_ok());
    }

    #[tokio::test]
    async fn failed_switch_leaves_everything_unchanged() {
        let dir = tempdir().unwrap();
        let selector = selector(&dir, empty_s3());
        let before = selector.get_instance().await.unwrap();

        let result = selector.set_strategy(BackendKind::Remote).await;

        assert!(matches!(result, Err(StorageError::Configuration(_))));
        assert_eq!(selector.settings().backend_kind(), BackendKind::Local);
        let current = selector.get_instance().await.unwrap();
        assert!(Arc::ptr_eq(&before, &current));
    }

    #[tokio::test]
    async fn unconstructible_kind_is_not_cached() {
        let dir = tempdir().unwrap();
        let selector = selector(&dir, empty_s3());
        selector.settings().update(SettingsUpdate::backend(BackendKind::Remote));

        assert!(matches!(
            selector.get_instance().await,
            Err(StorageError::Configuration(_))
        ));
        assert_eq!(selector.cached_kind().await, None);
    }

    #[tokio::test]
    async fn unknown_strategy_name_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let selector = selector(&dir, empty_s3());

        assert!(matches!(
            selector.set_strategy_named("ftp").await,
            Err(StorageError::Configuration(_))
        ));
        assert_eq!(selector.cached_kind().await, None);
    }

    #[tokio::test]
    async fn config_change_is_picked_up_on_next_call() {
        let dir = tempdir().unwrap();
        let storage = storage_settings(&dir, empty_s3());
        let settings = ConfigState::new(RuntimeSettings {
            backend_kind: BackendKind::Remote,
            retention_mode: RetentionMode::Permanent,
            url_expiration_seconds: 60,
        });
        let selector = BackendSelector::new(Arc::clone(&settings), storage, "secret");
        assert!(selector.get_instance().await.is_err());

        settings.update(SettingsUpdate::backend(BackendKind::Local));

        let backend = selector.get_instance().await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Local);
        assert!(backend.token_verifier().is_some());
    }

    #[cfg(feature = "s3")]
    #[tokio::test]
    async fn switch_to_remote_updates_configured_kind() {
        let dir = tempdir().unwrap();
        let s3 = S3Settings {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "id".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "images".to_string(),
            ..empty_s3()
        };
        let selector = selector(&dir, s3);
        selector.get_instance().await.unwrap();

        selector.set_strategy_named("s3").await.unwrap();

        let backend = selector.get_instance().await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Remote);
        assert!(backend.token_verifier().is_none());
        assert_eq!(selector.settings().backend_kind(), BackendKind::Remote);
    }

    #[cfg(feature = "s3")]
    #[tokio::test]
    async fn local_snapshot_keeps_writing_locally_after_switch_to_remote() {
        let dir = tempdir().unwrap();
        let s3 = S3Settings {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "id".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "images".to_string(),
            ..empty_s3()
        };
        let selector = selector(&dir, s3);
        let before = selector.get_instance().await.unwrap();

        selector.set_strategy(BackendKind::Remote).await.unwrap();

        let key = before.save_file(Bytes::from_static(b"late"), "a.jpg").await.unwrap();
        let stored = dir.path().join("permanent").join(&key);
        assert_eq!(std::fs::read(stored).unwrap(), b"late");
        assert_eq!(before.kind(), BackendKind::Local);
        assert_eq!(selector.get_instance().await.unwrap().kind(), BackendKind::Remote);
    }
}

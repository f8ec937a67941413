use crate::models::{BackendKind, RetentionMode, StorageSettings};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage settings that can change while the server runs.
///
/// Values are reset from the config file on every restart; nothing here is
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettings {
    pub backend_kind: BackendKind,
    pub retention_mode: RetentionMode,
    pub url_expiration_seconds: u64,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub backend_kind: Option<BackendKind>,
    pub retention_mode: Option<RetentionMode>,
    pub url_expiration_seconds: Option<u64>,
}

impl SettingsUpdate {
    pub fn backend(kind: BackendKind) -> Self {
        Self { backend_kind: Some(kind), ..Self::default() }
    }

    pub fn retention(mode: RetentionMode) -> Self {
        Self { retention_mode: Some(mode), ..Self::default() }
    }

    pub fn url_expiration(seconds: u64) -> Self {
        Self { url_expiration_seconds: Some(seconds), ..Self::default() }
    }
}

/// Owner of the live [`RuntimeSettings`].
///
/// Shared as `Arc<ConfigState>` with the backend selector, the backends and the
/// admin handlers. Reads always see the latest update. Domain validation (for
/// example a positive expiration) is the caller's job.
#[derive(Debug)]
pub struct ConfigState {
    inner: RwLock<RuntimeSettings>,
}

impl ConfigState {
    pub fn new(initial: RuntimeSettings) -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(initial),
        })
    }

    pub fn from_storage(storage: &StorageSettings) -> Arc<Self> {
        Self::new(RuntimeSettings {
            backend_kind: storage.backend,
            retention_mode: storage.retention,
            url_expiration_seconds: storage.url_expiration_secs,
        })
    }

    /// Returns a copy of the current settings
    pub fn get(&self) -> RuntimeSettings {
        *self.inner.read()
    }

    /// Merges `update` into the live settings and returns the result
    pub fn update(&self, update: SettingsUpdate) -> RuntimeSettings {
        let mut settings = self.inner.write();

        if let Some(kind) = update.backend_kind {
            settings.backend_kind = kind;
        }
        if let Some(mode) = update.retention_mode {
            settings.retention_mode = mode;
        }
        if let Some(seconds) = update.url_expiration_seconds {
            settings.url_expiration_seconds = seconds;
        }

        tracing::debug!(
            backend = %settings.backend_kind,
            retention = %settings.retention_mode,
            url_expiration_seconds = settings.url_expiration_seconds,
            "Runtime settings updated"
        );

        *settings
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.inner.read().backend_kind
    }

    pub fn retention_mode(&self) -> RetentionMode {
        self.inner.read().retention_mode
    }

    pub fn url_expiration_seconds(&self) -> u64 {
        self.inner.read().url_expiration_seconds
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    // Application lifecycle
    Starting,
    Ready { addr: String, base_url: String },
    Shutdown,

    // Configuration
    ConfigLoading { path: String },
    ConfigLoaded { backend: String, retention: String, url_expiration_secs: u64 },
    ConfigCreated { path: String },
    ConfigMigrated { added_fields: Vec<String> },
    ConfigWarning { message: String },
    ConfigError { error: String },

    // Storage initialization
    StorageFolderCreated { path: String },
    StorageFoldersReady,
    BackendReady { kind: String },

    // Errors
    Error { context: String, error: String },
}

pub struct EventBus {
    #[allow(dead_code)]
    pub(super) silent_mode: bool,
}

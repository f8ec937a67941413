use imgvault_config::ConfigState;
use imgvault_storage::BackendSelector;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub(crate) selector: Arc<BackendSelector>,
    pub(crate) base_url: Arc<String>,
    pub(crate) api_key: Arc<String>,
    pub(crate) streaming_threshold_bytes: u64,
}

impl AppState {
    pub fn new(
        selector: Arc<BackendSelector>,
        base_url: String,
        api_key: String,
        streaming_threshold_mb: u64,
    ) -> Self {
        Self {
            selector,
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
            api_key: Arc::new(api_key),
            streaming_threshold_bytes: streaming_threshold_mb.saturating_mul(1024 * 1024),
        }
    }

    pub(crate) fn settings(&self) -> &Arc<ConfigState> {
        self.selector.settings()
    }

    /// Turns a backend URL into one a client can follow.
    ///
    /// Local URLs are server-relative; presigned remote URLs are already absolute.
    pub(crate) fn public_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

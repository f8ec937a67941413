use imgvault_config::RuntimeSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: RuntimeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Reply to every admin settings mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
    pub config: RuntimeSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyRequest {
    pub strategy: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempStorageRequest {
    pub temp_storage: bool,
}

/// Expiration arrives untyped so non-integers get a readable 400
#[derive(Debug, Clone, Deserialize)]
pub struct ExpirationRequest {
    pub expiration: serde_json::Value,
}

/// Partial update of the runtime settings; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub backend_kind: Option<String>,
    pub retention_mode: Option<String>,
    pub url_expiration_seconds: Option<serde_json::Value>,
}

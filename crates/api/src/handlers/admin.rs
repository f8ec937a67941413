use crate::errors::ApiError;
use crate::handlers::AppState;
use crate::models::{
    AdminResponse, ConfigPatch, ConfigResponse, DeleteResponse, ExpirationRequest,
    StrategyRequest, TempStorageRequest,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use imgvault_config::{BackendKind, RetentionMode, RuntimeSettings, SettingsUpdate};
use imgvault_storage::StorageBackend;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn positive_seconds(value: &serde_json::Value) -> Result<u64, ApiError> {
    value
        .as_u64()
        .filter(|seconds| *seconds > 0)
        .ok_or_else(|| ApiError::BadRequest("Expiration must be a positive integer".to_string()))
}

fn updated(message: String, config: RuntimeSettings) -> Json<AdminResponse> {
    Json(AdminResponse {
        success: true,
        message,
        config,
    })
}

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        success: true,
        config: state.settings().get(),
    })
}

/// Applies a partial settings update.
///
/// Every field is validated before anything changes. A backend change goes
/// through the selector so a backend that cannot be built is refused.
pub async fn patch_config(
    State(state): State<AppState>,
    payload: Result<Json<ConfigPatch>, JsonRejection>,
) -> Result<Json<AdminResponse>, ApiError> {
    let patch = json_body(payload)?;

    let backend_kind = patch
        .backend_kind
        .as_deref()
        .map(str::parse::<BackendKind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let retention_mode = patch
        .retention_mode
        .as_deref()
        .map(str::parse::<RetentionMode>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let url_expiration_seconds = patch
        .url_expiration_seconds
        .as_ref()
        .map(positive_seconds)
        .transpose()?;

    if let Some(kind) = backend_kind {
        state.selector.set_strategy(kind).await?;
    }

    let config = state.settings().update(SettingsUpdate {
        backend_kind: None,
        retention_mode,
        url_expiration_seconds,
    });
    tracing::info!(
        backend = %config.backend_kind,
        retention = %config.retention_mode,
        url_expiration_secs = config.url_expiration_seconds,
        "Runtime configuration updated"
    );

    Ok(updated("Configuration updated".to_string(), config))
}

pub async fn set_storage_strategy(
    State(state): State<AppState>,
    payload: Result<Json<StrategyRequest>, JsonRejection>,
) -> Result<Json<AdminResponse>, ApiError> {
    let request = json_body(payload)?;

    let backend = state.selector.set_strategy_named(&request.strategy).await?;
    Ok(updated(
        format!("Storage strategy changed to {}", backend.kind()),
        state.settings().get(),
    ))
}

pub async fn set_temp_storage(
    State(state): State<AppState>,
    payload: Result<Json<TempStorageRequest>, JsonRejection>,
) -> Result<Json<AdminResponse>, ApiError> {
    let request = json_body(payload)?;

    let mode = RetentionMode::from(request.temp_storage);
    let config = state.settings().update(SettingsUpdate::retention(mode));
    tracing::info!(retention = %mode, "Retention mode changed");

    Ok(updated(
        format!("Temp storage set to {}", request.temp_storage),
        config,
    ))
}

pub async fn set_url_expiration(
    State(state): State<AppState>,
    payload: Result<Json<ExpirationRequest>, JsonRejection>,
) -> Result<Json<AdminResponse>, ApiError> {
    let request = json_body(payload)?;

    let seconds = positive_seconds(&request.expiration)?;
    let config = state.settings().update(SettingsUpdate::url_expiration(seconds));
    tracing::info!(url_expiration_secs = seconds, "URL expiration changed");

    Ok(updated(
        format!("URL expiration set to {} seconds", seconds),
        config,
    ))
}

/// Removes a stored file under the current retention mode
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let backend = state.selector.get_instance().await?;
    backend.delete_file(&filename).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("File deleted: {}", filename),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expiration_must_be_a_positive_integer() {
        assert_eq!(positive_seconds(&json!(60)).unwrap(), 60);

        for bad in [json!(0), json!(-5), json!(1.5), json!("60"), json!(null)] {
            assert!(matches!(positive_seconds(&bad), Err(ApiError::BadRequest(_))));
        }
    }
}

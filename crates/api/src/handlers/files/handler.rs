use super::disk;
use crate::errors::ApiError;
use crate::handlers::AppState;
use imgvault_storage::StorageBackend;
use axum::{
    extract::{Path, State},
    response::Response,
};

/// Serves a locally stored file to whoever holds a valid token
pub async fn serve_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let backend = state.selector.get_instance().await?;

    // Remote URLs are verified by the object store, never by us
    let verifier = backend.token_verifier().ok_or_else(|| {
        tracing::debug!(backend = %backend.kind(), "serve_file: token route unavailable for backend");
        ApiError::FileNotFound
    })?;

    let full_path = verifier.verify_token(&token)?;

    disk::serve_from_disk(full_path, state.streaming_threshold_bytes).await
}

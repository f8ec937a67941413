use crate::errors::ApiError;
use crate::handlers::AppState;
use crate::models::{UploadResponse, UrlResponse};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use imgvault_storage::StorageBackend;

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// Name used when the client sends no file name
const FALLBACK_FILE_NAME: &str = "image";

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            tracing::warn!(content_type = %content_type, "upload_image: rejected file type");
            return Err(ApiError::BadRequest(format!(
                "Rejected file type: {}",
                content_type
            )));
        }

        let original_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let backend = state.selector.get_instance().await?;
        let filename = backend.save_file(content, &original_name).await?;
        let url = backend.get_file_url(&filename).await?;

        return Ok(Json(UploadResponse {
            success: true,
            url: state.public_url(&url),
            filename,
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

pub async fn get_file_url(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<UrlResponse>, ApiError> {
    let backend = state.selector.get_instance().await?;
    let url = backend.get_file_url(&filename).await?;

    Ok(Json(UrlResponse {
        success: true,
        url: state.public_url(&url),
    }))
}

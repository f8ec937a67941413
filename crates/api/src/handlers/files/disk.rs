use crate::errors::ApiError;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

/// Serves a verified file, either by streaming or loading into memory.
///
/// The threshold is configurable via server.streaming_threshold_mb. A file that
/// vanished since its token was minted answers like a bad token.
pub async fn serve_from_disk(
    full_path: PathBuf,
    streaming_threshold_bytes: u64,
) -> Result<Response, ApiError> {
    let metadata = match tokio::fs::metadata(&full_path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            tracing::warn!("serve_file: token points at a file that no longer exists");
            return Err(ApiError::InvalidToken);
        }
    };

    let mime_type = mime_guess::from_path(&full_path)
        .first_or_octet_stream()
        .to_string();
    let file_size = metadata.len();

    if file_size > streaming_threshold_bytes {
        stream_large_file(full_path, mime_type, file_size).await
    } else {
        load_small_file(full_path, mime_type).await
    }
}

async fn stream_large_file(
    full_path: PathBuf,
    mime_type: String,
    file_size: u64,
) -> Result<Response, ApiError> {
    tracing::debug!(
        size_mb = file_size as f64 / 1024.0 / 1024.0,
        "serve_file: streaming large file"
    );

    let file = tokio::fs::File::open(&full_path)
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to open stored file: {}", e)))?;

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type),
            (header::CONTENT_LENGTH, file_size.to_string()),
        ],
        body,
    )
        .into_response())
}

async fn load_small_file(full_path: PathBuf, mime_type: String) -> Result<Response, ApiError> {
    let content = tokio::fs::read(&full_path)
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to read stored file: {}", e)))?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, mime_type)], content).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn small_files_are_served_with_guessed_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"12345").await.unwrap();

        let response = serve_from_disk(path, 1024).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"12345");
    }

    #[tokio::test]
    async fn large_files_are_streamed_whole() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        let content = vec![7u8; 64 * 1024];
        tokio::fs::write(&path, &content).await.unwrap();

        let response = serve_from_disk(path, 1024).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "65536");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), content.len());
    }

    #[tokio::test]
    async fn missing_file_reads_as_invalid_token() {
        let dir = tempdir().unwrap();

        let result = serve_from_disk(dir.path().join("gone.jpg"), 1024).await;

        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }
}

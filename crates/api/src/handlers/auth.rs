use crate::errors::ApiError;
use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests without the configured `x-api-key`.
///
/// An empty configured key matches nothing, so keyed routes stay closed until
/// one is set.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    let Some(provided) = provided else {
        tracing::warn!(path = %request.uri().path(), "API request without key");
        return Err(ApiError::Unauthorized("API key is required"));
    };

    if state.api_key.is_empty() || provided != state.api_key.as_str() {
        tracing::warn!(path = %request.uri().path(), "Invalid API key used");
        return Err(ApiError::Unauthorized("Invalid API key"));
    }

    Ok(next.run(request).await)
}

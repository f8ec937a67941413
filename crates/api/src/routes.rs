use crate::handlers::{
    delete_file, get_config, get_file_url, patch_config, require_api_key, serve_file,
    set_storage_strategy, set_temp_storage, set_url_expiration, upload_image, AppState,
};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

/// Builds the `/api` route table.
///
/// Everything except the token-gated file route sits behind the API key. Server
/// wide layers (limits, CORS, tracing) are added by the binary.
pub fn build(state: AppState) -> Router {
    let keyed = Router::new()
        .route("/upload", post(upload_image))
        .route("/url/:filename", get(get_file_url))
        .route("/admin/config", get(get_config).patch(patch_config))
        .route("/admin/storage/strategy", post(set_storage_strategy))
        .route("/admin/storage/temp", post(set_temp_storage))
        .route("/admin/url-expiration", post(set_url_expiration))
        .route("/admin/files/:filename", delete(delete_file))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let public = Router::new().route("/file/:token", get(serve_file));

    Router::new()
        .nest("/api", keyed.merge(public))
        .with_state(state)
}

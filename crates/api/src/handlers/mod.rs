mod admin;
mod auth;
mod state;
mod upload;
pub mod files;

pub use admin::{
    delete_file, get_config, patch_config, set_storage_strategy, set_temp_storage,
    set_url_expiration,
};
pub use auth::require_api_key;
pub use files::serve_file;
pub use state::AppState;
pub use upload::{get_file_url, upload_image};

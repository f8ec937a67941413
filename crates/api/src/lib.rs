pub mod handlers;
pub mod models;
pub mod errors;
pub mod routes;

pub use handlers::*;
pub use models::*;
pub use errors::ApiError;

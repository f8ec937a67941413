mod models;
mod defaults;
mod loader;
mod migration;
mod state;
mod errors;

pub use models::*;
pub use state::{ConfigState, RuntimeSettings, SettingsUpdate};
pub use errors::ConfigError;
pub use loader::ENV_PREFIX;

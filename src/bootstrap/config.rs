use imgvault_config::Config;
use imgvault_events::{AppEvent, EventBus};
use imgvault_filesystem::FileSystem;
use anyhow::Result;
use std::sync::Arc;

pub async fn load(config_path: &str, events: &Arc<EventBus>) -> Result<Config> {
    let abs_config_path = FileSystem::get_absolute_path_string(config_path)?;

    events.emit(AppEvent::ConfigLoading {
        path: abs_config_path.clone(),
    });

    let config_exists = std::path::Path::new(config_path).exists();
    let config = match Config::from_file_with_events(config_path, Some(events)).await {
        Ok(config) => config,
        Err(e) => {
            events.emit(AppEvent::ConfigError {
                error: e.to_string(),
            });
            return Err(e);
        }
    };

    if !config_exists {
        events.emit(AppEvent::ConfigCreated {
            path: abs_config_path,
        });
    }

    events.emit(AppEvent::ConfigLoaded {
        backend: config.storage.backend.to_string(),
        retention: config.storage.retention.to_string(),
        url_expiration_secs: config.storage.url_expiration_secs,
    });

    Ok(config)
}

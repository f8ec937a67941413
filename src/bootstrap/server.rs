use imgvault_config::Config;
use imgvault_events::{AppEvent, EventBus};
use imgvault_filesystem::FileSystem;
use anyhow::Result;
use std::sync::Arc;

/// Creates both local storage roots up front.
///
/// They are needed even when the remote backend is configured, since an admin
/// can switch to the local backend at runtime.
pub async fn initialize_folders(config: &Config, events: &Arc<EventBus>) -> Result<()> {
    let local = &config.storage.local;
    let (permanent, temp) =
        FileSystem::ensure_storage_structure(&local.permanent_dir, &local.temp_dir).await?;

    for path in [permanent, temp] {
        events.emit(AppEvent::StorageFolderCreated {
            path: path.display().to_string(),
        });
    }

    events.emit(AppEvent::StorageFoldersReady);

    Ok(())
}

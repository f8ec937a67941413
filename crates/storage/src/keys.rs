use crate::StorageResult;
use imgvault_config::RetentionMode;
use imgvault_utils::sanitize_upload_name;

/// The single slot every temporary upload is written to
pub const TEMP_FILE_NAME: &str = "temp.jpg";

/// Derives the storage key for an upload.
///
/// Temporary uploads always land on [`TEMP_FILE_NAME`], so a new one supersedes
/// the previous. Permanent uploads keep the client's file name, prefixed with the
/// upload time in milliseconds when `timestamp_prefix` is set.
pub fn storage_key_for(
    mode: RetentionMode,
    original_name: &str,
    timestamp_prefix: bool,
) -> StorageResult<String> {
    match mode {
        RetentionMode::Temporary => Ok(TEMP_FILE_NAME.to_string()),
        RetentionMode::Permanent => {
            let name = sanitize_upload_name(original_name)?;
            if timestamp_prefix {
                Ok(format!("{}-{}", chrono::Utc::now().timestamp_millis(), name))
            } else {
                Ok(name)
            }
        }
    }
}

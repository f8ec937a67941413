use crate::UtilsError;
use std::path::Path;

/// Validates that a storage key is a single plain file name.
///
/// Keys are joined onto a storage directory or an object prefix, so anything that
/// could climb out of it or name the directory itself (separators, `..`, `.`,
/// drive letters, NUL) is rejected.
pub fn validate_file_name(name: &str) -> Result<(), UtilsError> {
    if name.is_empty() {
        return Err(UtilsError::InvalidFileName("empty name".to_string()));
    }

    if name.contains('\0') {
        return Err(UtilsError::NullByte);
    }

    if name.contains("..") {
        return Err(UtilsError::PathTraversal);
    }

    // "." names the storage directory itself
    if name.chars().all(|c| c == '.') {
        return Err(UtilsError::InvalidFileName("name must not be only dots".to_string()));
    }

    if name.starts_with('/') || name.starts_with('\\') {
        return Err(UtilsError::AbsolutePath);
    }

    // Windows drive letters (C:, D:, etc.)
    if name.len() >= 2 && name.chars().nth(1) == Some(':') {
        return Err(UtilsError::AbsolutePath);
    }

    if name.contains('/') || name.contains('\\') {
        return Err(UtilsError::InvalidFileName(
            "name must not contain path separators".to_string(),
        ));
    }

    Ok(())
}

/// Reduces a client-supplied upload name to its last path component.
///
/// Browsers sometimes send full client paths (`C:\Users\me\cat.jpg`); only the
/// trailing file name is kept, and the result still has to pass
/// [`validate_file_name`].
pub fn sanitize_upload_name(original: &str) -> Result<String, UtilsError> {
    let normalized = original.replace('\\', "/");
    let last = normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim();

    validate_file_name(last)?;
    Ok(last.to_string())
}

pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

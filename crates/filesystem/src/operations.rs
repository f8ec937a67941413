use super::models::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FileSystem {
    /// Creates the permanent and temporary storage roots and returns their
    /// absolute, canonical paths.
    pub async fn ensure_storage_structure(
        permanent_dir: &str,
        temp_dir: &str,
    ) -> Result<(PathBuf, PathBuf)> {
        let permanent = Self::ensure_directory(Path::new(permanent_dir), "Permanent storage").await?;
        let temp = Self::ensure_directory(Path::new(temp_dir), "Temporary storage").await?;
        Ok((permanent, temp))
    }

    /// Idempotently creates `path` and returns its canonical absolute form.
    pub async fn ensure_directory(path: &Path, description: &str) -> Result<PathBuf> {
        let abs_path = Self::get_absolute_path(path)?;
        Self::create_directory(&abs_path, description).await?;
        Ok(fs::canonicalize(&abs_path).await?)
    }

    /// Writes `data` to a staging file next to `target` and renames it into place.
    ///
    /// Readers of `target` see either the previous content or the complete new
    /// content. Concurrent writers to the same target race; the last rename wins.
    pub async fn write_atomic(target: &Path, data: &[u8]) -> std::io::Result<()> {
        let staging = Self::staging_path(target);

        let result = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&staging, target).await
        }
        .await;

        if result.is_err() {
            // Best effort; the staging name is unique so leftovers never shadow a key
            let _ = fs::remove_file(&staging).await;
        }

        result
    }

    fn staging_path(target: &Path) -> PathBuf {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let seq = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        let staging_name = format!(".{}.{}.{}.part", file_name, std::process::id(), seq);

        match target.parent() {
            Some(parent) => parent.join(staging_name),
            None => PathBuf::from(staging_name),
        }
    }

    async fn create_directory(path: &Path, description: &str) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
            tracing::debug!("    Created: {} ({})", path.display(), description);
        } else {
            tracing::debug!("    Exists:  {} ({})", path.display(), description);
        }
        Ok(())
    }

    fn get_absolute_path(path: &Path) -> Result<PathBuf> {
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(abs_path)
    }

    pub fn get_absolute_path_string(path: &str) -> Result<String> {
        let path_buf = PathBuf::from(path);
        let abs = Self::get_absolute_path(&path_buf)?;
        Ok(abs.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn ensure_storage_structure_is_idempotent() {
        let dir = tempdir().unwrap();
        let permanent = dir.path().join("uploads/permanent");
        let temp = dir.path().join("uploads/temp");

        let first = FileSystem::ensure_storage_structure(
            permanent.to_str().unwrap(),
            temp.to_str().unwrap(),
        )
        .await
        .unwrap();
        let second = FileSystem::ensure_storage_structure(
            permanent.to_str().unwrap(),
            temp.to_str().unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(first, second);
        assert!(first.0.is_absolute() && first.0.is_dir());
        assert!(first.1.is_absolute() && first.1.is_dir());
    }

    #[tokio::test]
    async fn write_atomic_replaces_content_and_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("temp.jpg");

        FileSystem::write_atomic(&target, b"first").await.unwrap();
        FileSystem::write_atomic(&target, b"second!").await.unwrap();

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"second!");

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["temp.jpg".to_string()]);
    }

    #[tokio::test]
    async fn write_atomic_fails_when_directory_is_missing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing/a.jpg");

        assert!(FileSystem::write_atomic(&target, b"data").await.is_err());
    }
}

//! Atomic file replacement.
//!
//! Collection files are rewritten as a whole on every mutation. Writing to a
//! temp file in the same directory and renaming it over the target means a
//! reader sees either the previous document set or the new one, never a
//! partially written file.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to `path` atomically.
///
/// The parent directory is created if it does not exist yet. The temp file is
/// removed automatically if any step fails.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent, the temp file cannot be
/// created or written, or the final rename fails.
pub async fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))?
        .to_path_buf();
    let target_path = path.to_path_buf();
    let content_owned = content.to_string();

    tokio::fs::create_dir_all(&parent).await?;

    // tempfile is synchronous; keep it off the async worker threads
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content_owned.as_bytes())?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;

        // persist consumes the NamedTempFile, preventing auto-deletion
        temp_file.persist(&target_path)?;

        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_atomic_write_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("skills.json");

        atomic_write(&file_path, r#"{"documents": []}"#)
            .await
            .unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, r#"{"documents": []}"#);
    }

    #[tokio::test]
    async fn test_atomic_write_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("skills.json");
        std::fs::write(&file_path, "initial").unwrap();

        atomic_write(&file_path, "updated").await.unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "updated");
    }

    #[tokio::test]
    async fn test_atomic_write_creates_missing_parent() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("projects.json");

        atomic_write(&file_path, "content").await.unwrap();

        assert!(file_path.exists());
    }

    #[tokio::test]
    async fn test_atomic_write_no_leftover_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("projects.json");

        atomic_write(&file_path, "content").await.unwrap();

        let count = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, 1, "Should only have the target file, no temp files");
    }
}

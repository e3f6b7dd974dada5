use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writes `contents` to `path` via a temp file in the same directory
/// followed by a rename, so a crash mid-write can never leave a
/// truncated or partially-written state/backup/pid file behind.
pub async fn write_atomic(path: &Path, contents: Vec<u8>) -> std::io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(&contents)?;
        temp.flush()?;
        temp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "wrote file atomically");
        Ok(())
    })
    .await
    .expect("blocking write task should not panic")
}

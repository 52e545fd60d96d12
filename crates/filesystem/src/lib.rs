//! Quarantine/library filesystem operations (§4.8): computing destinations under three
//! configured roots, stripping non-media files before a scan, and moving/deleting payloads.
//! The recursive walk reuses this workspace's boxed-future pattern for async recursion.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use acquisitiond_core::{MediaKind, PipelineError, Result};
use tracing::{debug, warn};

/// Video container extensions the pipeline keeps. Matches this workspace's media-detection
/// vocabulary, extended with subtitle formats since §4.8 keeps those too.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "3g2", "mxf",
];
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "ssa", "vtt"];

#[derive(Debug, Clone)]
pub struct FilesystemConfig {
    pub quarantine_root: PathBuf,
    pub movie_root: PathBuf,
    pub show_root: PathBuf,
}

pub struct FilesystemService {
    config: FilesystemConfig,
}

impl FilesystemService {
    pub fn new(config: FilesystemConfig) -> Self {
        Self { config }
    }

    pub fn quarantine_path(&self, name: &str) -> PathBuf {
        self.config.quarantine_root.join(name)
    }

    pub fn library_destination(&self, kind: MediaKind, name: &str) -> PathBuf {
        match kind {
            MediaKind::Movie => self.config.movie_root.join(name),
            MediaKind::Show => self.config.show_root.join(name),
        }
    }

    fn is_allowed(path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        VIDEO_EXTENSIONS.contains(&ext.as_str()) || SUBTITLE_EXTENSIONS.contains(&ext.as_str())
    }

    /// Deletes every file under `path` whose extension is not in the allow-list. Runs before
    /// scanning so sample/NFO/executable files never influence the verdict. Returns the count
    /// of files removed.
    pub async fn strip_non_media(&self, path: &Path) -> Result<usize> {
        if path.is_file() {
            return if Self::is_allowed(path) {
                Ok(0)
            } else {
                tokio::fs::remove_file(path).await.map_err(|e| fs_err(path, e))?;
                Ok(1)
            };
        }

        let mut removed = 0usize;
        strip_recursive(path, &mut removed).await?;
        Ok(removed)
    }

    /// Moves `src` to `dst`, creating the destination's parent directory first. Prefers an
    /// atomic rename; falls back to cross-device copy-then-delete for directories crossing
    /// filesystems, since `rename` alone cannot span them.
    pub async fn move_path(&self, src: &Path, dst: &Path) -> Result<()> {
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| fs_err(parent, e))?;
        }

        match tokio::fs::rename(src, dst).await {
            Ok(()) => Ok(()),
            Err(err) if err.raw_os_error() == Some(libc_exdev()) => {
                debug!(?src, ?dst, "cross-device move, falling back to copy-then-delete");
                copy_recursive(src, dst).await?;
                self.delete(src).await
            }
            Err(err) => Err(fs_err(src, err)),
        }
    }

    pub async fn delete(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            tokio::fs::remove_dir_all(path).await.map_err(|e| fs_err(path, e))
        } else {
            tokio::fs::remove_file(path).await.map_err(|e| fs_err(path, e))
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    pub fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    pub fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn strip_recursive<'a>(dir: &'a Path, removed: &'a mut usize) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| fs_err(dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| fs_err(dir, e))? {
            let path = entry.path();
            if path.is_dir() {
                strip_recursive(&path, removed).await?;
            } else if !FilesystemService::is_allowed(&path) {
                tokio::fs::remove_file(&path).await.map_err(|e| fs_err(&path, e))?;
                *removed += 1;
            }
        }
        Ok(())
    })
}

fn copy_recursive<'a>(src: &'a Path, dst: &'a Path) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        if src.is_dir() {
            tokio::fs::create_dir_all(dst).await.map_err(|e| fs_err(dst, e))?;
            let mut entries = tokio::fs::read_dir(src).await.map_err(|e| fs_err(src, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| fs_err(src, e))? {
                let child_dst = dst.join(entry.file_name());
                copy_recursive(&entry.path(), &child_dst).await?;
            }
            Ok(())
        } else {
            tokio::fs::copy(src, dst).await.map_err(|e| fs_err(src, e))?;
            Ok(())
        }
    })
}

#[cfg(unix)]
fn libc_exdev() -> i32 {
    18
}

#[cfg(not(unix))]
fn libc_exdev() -> i32 {
    -1
}

fn fs_err(path: &Path, err: std::io::Error) -> PipelineError {
    warn!(?path, error = %err, "filesystem operation failed");
    PipelineError::FilesystemError { path: path.display().to_string(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(root: &Path) -> FilesystemConfig {
        FilesystemConfig {
            quarantine_root: root.join("quarantine"),
            movie_root: root.join("movies"),
            show_root: root.join("shows"),
        }
    }

    #[tokio::test]
    async fn strip_non_media_removes_non_allowed_extensions() {
        let tmp = tempdir().unwrap();
        let payload = tmp.path().join("payload");
        tokio::fs::create_dir_all(&payload).await.unwrap();
        tokio::fs::write(payload.join("movie.mkv"), b"x").await.unwrap();
        tokio::fs::write(payload.join("sample.txt"), b"x").await.unwrap();
        tokio::fs::write(payload.join("virus.exe"), b"x").await.unwrap();

        let service = FilesystemService::new(config(tmp.path()));
        let removed = service.strip_non_media(&payload).await.unwrap();

        assert_eq!(removed, 2);
        assert!(payload.join("movie.mkv").exists());
        assert!(!payload.join("sample.txt").exists());
    }

    #[tokio::test]
    async fn move_path_creates_destination_parent() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src.mkv");
        tokio::fs::write(&src, b"x").await.unwrap();

        let service = FilesystemService::new(config(tmp.path()));
        let dst = service.library_destination(MediaKind::Movie, "Movie (2020)/movie.mkv");
        service.move_path(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[tokio::test]
    async fn delete_removes_directory_recursively() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("to_delete");
        tokio::fs::create_dir_all(dir.join("nested")).await.unwrap();
        tokio::fs::write(dir.join("nested/file.mkv"), b"x").await.unwrap();

        let service = FilesystemService::new(config(tmp.path()));
        service.delete(&dir).await.unwrap();

        assert!(!dir.exists());
    }
}

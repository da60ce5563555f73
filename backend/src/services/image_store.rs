//! Temporary storage for uploaded images
//!
//! Uploads are written under a generated UUID so client filenames never
//! reach the filesystem; only a short alphanumeric extension is kept. Each
//! stored file is removed after the configured delay once its
//! [`StoredImage`] handle is dropped. Removals still pending when the process
//! exits are picked up by [`ImageStore::sweep`] on the next start.

use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

const MAX_EXTENSION_LEN: usize = 5;

/// Upload directory with delayed cleanup
#[derive(Clone, Debug)]
pub struct ImageStore {
    dir: PathBuf,
    cleanup_delay: Duration,
}

/// Handle to a stored upload; dropping it schedules removal
#[derive(Debug)]
pub struct StoredImage {
    path: PathBuf,
    cleanup_delay: Duration,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, cleanup_delay: Duration) -> Self {
        Self {
            dir: dir.into(),
            cleanup_delay,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if needed
    pub fn ensure_dir(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::StorageError(format!(
                "Failed to create upload directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Remove uploads left behind by an earlier run
    ///
    /// Only files named like [`ImageStore::save`] names them are touched;
    /// anything else in the directory is left alone. Returns how many files
    /// were removed.
    pub fn sweep(&self) -> AppResult<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(AppError::StorageError(format!(
                    "Failed to read upload directory {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut removed = 0;
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file || !is_stored_upload_name(&path) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log_cleanup_failure(&path, &e),
            }
        }

        if removed > 0 {
            tracing::info!(
                "Removed {} stale uploads from {}",
                removed,
                self.dir.display()
            );
        }
        Ok(removed)
    }

    /// Write an upload to disk
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> AppResult<StoredImage> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to create upload directory: {}", e)))?;

        let mut file_name = Uuid::new_v4().to_string();
        if let Some(ext) = original_name.and_then(sanitized_extension) {
            file_name.push('.');
            file_name.push_str(&ext);
        }
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write upload: {}", e)))?;

        tracing::debug!(
            "Stored upload {:?} ({} bytes) at {}",
            original_name,
            bytes.len(),
            path.display()
        );

        Ok(StoredImage {
            path,
            cleanup_delay: self.cleanup_delay,
        })
    }
}

impl StoredImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoredImage {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        let delay = self.cleanup_delay;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        log_cleanup_failure(&path, &e);
                    }
                });
            }
            Err(_) => {
                if let Err(e) = std::fs::remove_file(&path) {
                    log_cleanup_failure(&path, &e);
                }
            }
        }
    }
}

fn log_cleanup_failure(path: &Path, e: &std::io::Error) {
    if e.kind() == std::io::ErrorKind::NotFound {
        tracing::debug!("Upload {} already removed", path.display());
    } else {
        tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
    }
}

/// Whether a file name has the `<uuid>[.<ext>]` shape given to uploads
fn is_stored_upload_name(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let extension_ok = match path.extension().map(|ext| ext.to_str()) {
        None => true,
        Some(Some(ext)) => {
            (1..=MAX_EXTENSION_LEN).contains(&ext.len())
                && ext
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }
        Some(None) => false,
    };
    extension_ok && Uuid::parse_str(stem).is_ok()
}

/// Lowercase extension of a client filename, if it is short and alphanumeric
pub fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

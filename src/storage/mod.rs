pub mod upload;

pub use upload::UploadSink;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Upload size ceiling: 4 GiB.
pub const MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Per-process sequence folded into stored names so that two uploads
/// landing in the same millisecond cannot collide.
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single flat directory holding all uploaded blobs. The directory is
/// the only source of truth: listings re-derive metadata from it on
/// every call rather than trusting a cached index.
pub struct StorageDir {
    base: PathBuf,
}

/// One regular file found in the storage directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl StorageDir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a client-supplied name to a path inside the storage
    /// directory. Names with path separators or a leading dot (which
    /// covers the `.`/`..` components and the in-flight upload temps)
    /// are rejected. With separators gone the name is always a single
    /// path component, so a `..` elsewhere in the name is just text.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.starts_with('.')
        {
            return Err(AppError::InvalidPath(name.to_string()));
        }
        Ok(self.base.join(name))
    }

    /// Generate a fresh stored name for an upload: arrival timestamp,
    /// process-wide sequence, then the sanitized client name.
    pub fn stored_name(original_name: &str) -> String {
        let sanitized: String = original_name
            .chars()
            .map(|c| match c {
                '/' | '\\' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let sanitized = sanitized.trim_start_matches('.');
        let sanitized = if sanitized.is_empty() { "file" } else { sanitized };

        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:04}-{}", Utc::now().timestamp_millis(), seq, sanitized)
    }

    /// Start a streaming upload. Bytes go to a hidden temp file that is
    /// renamed into place on finish and removed if the sink is dropped
    /// before finishing (client abort, write error, size overflow).
    pub async fn begin_upload(&self, limit: u64) -> Result<UploadSink> {
        let temp_path = self.base.join(format!(".{}.part", Uuid::new_v4()));
        UploadSink::create(self.base.clone(), temp_path, limit).await
    }

    /// Enumerate every regular file in the directory, temp files included.
    pub async fn entries(&self) -> Result<Vec<StoredFile>> {
        let mut out = Vec::new();
        let mut dir = fs::read_dir(&self.base)
            .await
            .map_err(|e| AppError::StorageRead(format!("Failed to read storage directory: {e}")))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| AppError::StorageRead(format!("Failed to read directory entry: {e}")))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Failed to stat {}: {}", name, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.push(StoredFile {
                name,
                size: metadata.len(),
                modified,
            });
        }

        Ok(out)
    }

    /// Enumerate client-visible files, skipping in-flight upload temps.
    pub async fn visible(&self) -> Result<Vec<StoredFile>> {
        let mut files = self.entries().await?;
        files.retain(|f| !f.name.starts_with('.'));
        Ok(files)
    }

    /// Remove one blob by name. Absent files are an error, not a no-op;
    /// concurrent deleters observe `NotFound` for the loser.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File not found: {name}"))
            } else {
                AppError::StorageWrite(format!("Failed to delete {name}: {e}"))
            }
        })?;
        tracing::debug!("Deleted file {:?}", path);
        Ok(())
    }
}

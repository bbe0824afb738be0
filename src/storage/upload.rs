use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Streaming destination for one in-flight upload.
///
/// Bytes are written to a hidden temp file in the storage directory and
/// only renamed to the final stored name on [`finish`]. Dropping an
/// unfinished sink removes the temp file, so aborted or failed uploads
/// never become visible records.
///
/// [`finish`]: UploadSink::finish
pub struct UploadSink {
    base: PathBuf,
    temp_path: PathBuf,
    file: File,
    written: u64,
    limit: u64,
    finished: bool,
}

impl UploadSink {
    pub(super) async fn create(base: PathBuf, temp_path: PathBuf, limit: u64) -> Result<Self> {
        let file = File::create(&temp_path)
            .await
            .map_err(|e| AppError::StorageWrite(format!("Failed to create upload file: {e}")))?;
        Ok(Self {
            base,
            temp_path,
            file,
            written: 0,
            limit,
            finished: false,
        })
    }

    /// Append one chunk, enforcing the size ceiling.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.written += chunk.len() as u64;
        if self.written > self.limit {
            return Err(AppError::PayloadTooLarge(self.limit));
        }
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| AppError::StorageWrite(format!("Failed to write upload chunk: {e}")))?;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush and move the temp file to its final stored name, returning
    /// the byte count actually persisted.
    pub async fn finish(mut self, stored_name: &str) -> Result<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| AppError::StorageWrite(format!("Failed to flush upload: {e}")))?;

        let final_path = self.base.join(stored_name);
        tokio::fs::rename(&self.temp_path, &final_path)
            .await
            .map_err(|e| AppError::StorageWrite(format!("Failed to persist upload: {e}")))?;

        self.finished = true;
        tracing::debug!("Stored upload at {:?} ({} bytes)", final_path, self.written);
        Ok(self.written)
    }
}

impl Drop for UploadSink {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to clean up {:?}: {}", self.temp_path, e);
                }
            }
        }
    }
}

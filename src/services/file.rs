use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::events::{EventBus, FileEvent};
use crate::models::{FileListEntry, FileRecord};
use crate::storage::{StorageDir, UploadSink};

/// Gateway logic over the storage directory and event bus.
pub struct FileService;

impl FileService {
    /// Enumerate the storage directory fresh and derive the listing.
    /// Ids are 1-based enumeration positions, stable across repeated
    /// calls as long as the directory does not change.
    pub async fn list_files(storage: &StorageDir) -> Result<Vec<FileListEntry>> {
        let files = storage.visible().await?;
        Ok(files
            .into_iter()
            .enumerate()
            .map(|(i, f)| FileListEntry {
                id: i as u64 + 1,
                url: format!("/uploads/{}", f.name),
                upload_date: DateTime::<Utc>::from(f.modified).to_rfc3339(),
                content_type: "application/octet-stream".to_string(),
                name: f.name,
                size: f.size,
            })
            .collect())
    }

    /// Persist a streamed upload under a fresh stored name and build
    /// its record. Publishing is left to the caller since single and
    /// batch uploads emit different events.
    pub async fn complete_upload(
        sink: UploadSink,
        original_name: &str,
        content_type: Option<String>,
        is_encrypted: bool,
    ) -> Result<FileRecord> {
        let stored_name = StorageDir::stored_name(original_name);
        let size = sink.finish(&stored_name).await?;
        let now = Utc::now();

        Ok(FileRecord {
            id: now.timestamp_millis(),
            url: format!("/uploads/{stored_name}"),
            name: stored_name,
            original_name: original_name.to_string(),
            size,
            content_type: content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            timestamp: now.to_rfc3339(),
            is_encrypted,
        })
    }

    /// Remove one blob and notify connected clients. Deleting an absent
    /// file surfaces `NotFound`; callers racing another deleter treat
    /// that as "already gone".
    pub async fn delete_file(storage: &StorageDir, events: &EventBus, name: &str) -> Result<()> {
        storage.remove(name).await?;
        events.publish(FileEvent::FileDeleted {
            filename: name.to_string(),
        });
        Ok(())
    }

    /// Remove every visible blob, best effort per file. Individual
    /// failures are logged and excluded from the returned count.
    pub async fn delete_all(storage: &StorageDir, events: &EventBus) -> Result<usize> {
        let files = storage.visible().await?;
        let mut deleted = 0;

        for file in files {
            match storage.remove(&file.name).await {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!("Failed to delete {}: {}", file.name, e),
            }
        }

        events.publish(FileEvent::AllFilesDeleted);
        Ok(deleted)
    }
}

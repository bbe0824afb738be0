use serde::Serialize;

/// Metadata for one stored blob, returned from uploads and carried on
/// push events.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Epoch milliseconds at upload completion.
    pub id: i64,
    /// Name the blob is stored under; unique within the storage directory.
    pub name: String,
    /// Display name supplied by the uploading client.
    pub original_name: String,
    /// Byte length read back from the persisted blob.
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub timestamp: String,
    pub url: String,
    /// Advisory flag set by the client; the payload is opaque to the server.
    pub is_encrypted: bool,
}

/// One row of `GET /api/files`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileListEntry {
    /// 1-based position in the directory enumeration.
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub upload_date: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_path: FileRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiUploadResponse {
    pub message: String,
    pub file_paths: Vec<FileRecord>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResponse {
    pub message: String,
    pub deleted_count: usize,
}

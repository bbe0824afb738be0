use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::events::FileEvent;
use crate::models::{
    DeleteAllResponse, DeleteResponse, FileListEntry, FileRecord, MultiUploadResponse,
    UploadResponse,
};
use crate::services::FileService;
use crate::storage::MAX_UPLOAD_BYTES;
use crate::AppState;

/// List all stored files
/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileListEntry>>> {
    let files = FileService::list_files(&state.storage).await?;
    Ok(Json(files))
}

/// Upload a single file
/// POST /api/upload (multipart field `file`, optional `isEncrypted`)
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut record: Option<FileRecord> = None;
    let mut is_encrypted = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            // Only the first file part counts; extras are skipped.
            "file" if record.is_none() => {
                record = Some(store_field(&state, &mut field).await?);
            }
            "isEncrypted" => {
                is_encrypted = field.text().await.unwrap_or_default() == "true";
            }
            _ => {}
        }
    }

    let mut record = record.ok_or_else(|| AppError::NoPayload("No file uploaded".to_string()))?;
    record.is_encrypted = is_encrypted;

    state
        .events
        .publish(FileEvent::FileUploaded(record.clone()));
    tracing::info!("Uploaded {} ({} bytes)", record.name, record.size);

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file_path: record,
    }))
}

/// Upload multiple files in one request
/// POST /api/upload-multiple (multipart field `files`, repeated)
///
/// Per-file contract: each file either fully persists or is excluded
/// from the result. One bad file does not roll back the others.
pub async fn upload_multiple(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MultiUploadResponse>> {
    let mut records: Vec<FileRecord> = Vec::new();
    let mut is_encrypted = false;
    let mut saw_file_part = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "files[]" => {
                saw_file_part = true;
                match store_field(&state, &mut field).await {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!("Skipping failed file in batch upload: {}", e);
                    }
                }
            }
            "isEncrypted" => {
                is_encrypted = field.text().await.unwrap_or_default() == "true";
            }
            _ => {}
        }
    }

    if !saw_file_part {
        return Err(AppError::NoPayload("No files uploaded".to_string()));
    }

    for record in &mut records {
        record.is_encrypted = is_encrypted;
    }

    state
        .events
        .publish(FileEvent::FilesUploaded(records.clone()));
    tracing::info!("Uploaded batch of {} file(s)", records.len());

    Ok(Json(MultiUploadResponse {
        message: "Files uploaded successfully".to_string(),
        file_paths: records,
    }))
}

/// Stream one multipart file field into the storage directory.
async fn store_field(state: &AppState, field: &mut Field<'_>) -> Result<FileRecord> {
    let original_name = field.file_name().unwrap_or("unnamed").to_string();
    let content_type = field.content_type().map(str::to_string);

    let mut sink = state.storage.begin_upload(MAX_UPLOAD_BYTES).await?;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload stream: {e}")))?
    {
        sink.write_chunk(&chunk).await?;
    }

    FileService::complete_upload(sink, &original_name, content_type, false).await
}

/// Download a file as an attachment
/// GET /api/download/:name
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.storage.resolve(&name)?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("File not found: {name}"))
        } else {
            AppError::StorageRead(format!("Failed to open {name}: {e}"))
        }
    })?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::StorageRead(format!("Failed to stat {name}: {e}")))?;

    let fallback_name = name.replace(['"', '\\'], "_");
    let encoded_name = urlencoding::encode(&name);

    let body = Body::from_stream(ReaderStream::new(file));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(body)
        .map_err(|e| AppError::StorageRead(format!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Delete one file
/// DELETE /api/delete/:name
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    FileService::delete_file(&state.storage, &state.events, &name).await?;
    tracing::info!("Deleted {}", name);
    Ok(Json(DeleteResponse {
        message: "File deleted successfully".to_string(),
    }))
}

/// Delete every stored file
/// DELETE /api/delete-all
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeleteAllResponse>> {
    let deleted = FileService::delete_all(&state.storage, &state.events).await?;
    tracing::info!("Deleted all files ({} removed)", deleted);
    Ok(Json(DeleteAllResponse {
        message: format!("Requested deletion of all files. Deleted: {deleted}"),
        deleted_count: deleted,
    }))
}

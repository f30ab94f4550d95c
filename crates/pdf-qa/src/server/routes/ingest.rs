//! Document upload endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::time::Instant;

use crate::ingestion::Upload;
use crate::server::state::AppState;
use crate::types::response::UploadResponse;

use super::ApiError;

/// Multipart field carrying the PDF
pub const DOCUMENT_FIELD: &str = "document";

const MISSING_DOCUMENT: &str = "No document uploaded. Send the PDF in the 'document' form field.";

/// POST /upload-document - Extract, chunk, embed and index a PDF
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let start = Instant::now();

    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Upload rejected, not a multipart request: {}", e);
        ApiError::bad_request(MISSING_DOCUMENT)
    })?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Failed to read upload: {}", e.body_text())))?
    {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), format!("Failed to read upload: {}", e.body_text())))?;
        upload = Some(Upload::new(filename, data));
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request(MISSING_DOCUMENT))?;
    tracing::info!(
        "Received document: {} ({} bytes)",
        upload.filename.as_deref().unwrap_or("<unnamed>"),
        upload.data.len()
    );

    let report = state
        .ingest()
        .ingest(upload)
        .await
        .map_err(|e| ApiError::from_pipeline("Error processing document", e))?;

    tracing::info!(
        "Upload complete: {} chunks in {}ms",
        report.chunk_count,
        start.elapsed().as_millis()
    );

    Ok(Json(UploadResponse {
        message: "Document processed and indexed successfully.".to_string(),
        chunk_count: report.chunk_count,
    }))
}

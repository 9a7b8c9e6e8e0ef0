use crate::AppState;
use crate::api::error::AppError;
use crate::models::{UploadRequest, UploadResponse};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use tracing::warn;
use utoipa::ToSchema;

/// Multipart form accepted by `/upload` (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Opaque caller token, stored nowhere and not validated
    sign: Option<String>,
}

struct FilePart {
    body: Bytes,
    content_type: String,
    file_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Malformed form or missing file", body = UploadResponse),
        (status = 405, description = "Method other than POST"),
        (status = 413, description = "Body exceeds the upload ceiling", body = UploadResponse),
        (status = 502, description = "Storage write failed", body = UploadResponse),
        (status = 504, description = "Storage write timed out", body = UploadResponse)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let mut file: Option<FilePart> = None;
    let mut sign: Option<String> = None;

    // The whole body is read before storage is touched, so an oversized
    // request fails here with nothing written.
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" if file.is_none() => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
                let file_name = field.file_name().map(|s| s.to_string());
                let body = field.bytes().await?;

                file = Some(FilePart {
                    body,
                    content_type,
                    file_name,
                });
            }
            "file" => warn!("Ignoring extra 'file' part"),
            "sign" => {
                sign = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let stored = state
        .upload_service
        .upload(UploadRequest {
            body: file.body,
            content_type: file.content_type,
            sign,
            file_name: file.file_name,
        })
        .await?;

    Ok(Json(UploadResponse::success(&stored)))
}

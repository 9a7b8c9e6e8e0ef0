use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A file extracted from the multipart form, ready to be stored
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub body: Bytes,
    pub content_type: String,
    /// Opaque caller token, passed through untouched
    pub sign: Option<String>,
    pub file_name: Option<String>,
}

/// The object written to the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: Uuid,
    pub key: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn success(object: &StoredObject) -> Self {
        Self {
            status: UploadStatus::Success,
            id: Some(object.id.to_string()),
            url: object.url.clone(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Error,
            id: None,
            url: None,
            error: Some(message.into()),
        }
    }
}

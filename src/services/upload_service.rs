use crate::config::StorageConfig;
use crate::models::{StoredObject, UploadRequest};
use crate::services::storage::StorageService;
use crate::utils::object_key::ObjectKeyPattern;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("storage write timed out after {0:?}")]
    Timeout(Duration),
}

/// Stores uploaded files under freshly generated keys.
pub struct UploadService {
    storage: Arc<dyn StorageService>,
    key_pattern: ObjectKeyPattern,
    timeout: Duration,
    public_base_url: Option<String>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn StorageService>, config: &StorageConfig) -> Self {
        Self {
            storage,
            key_pattern: config.key_pattern.clone(),
            timeout: config.timeout,
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Issues exactly one storage write for the request. No retries; a write
    /// still pending after the configured timeout is abandoned.
    pub async fn upload(&self, request: UploadRequest) -> Result<StoredObject, UploadError> {
        let (id, key) = self.key_pattern.generate();
        let size = request.body.len();

        // `sign` is not interpreted here; only its presence is recorded.
        debug!(
            key = %key,
            has_sign = request.sign.is_some(),
            file_name = request.file_name.as_deref().unwrap_or(""),
            "storing upload"
        );

        let write = self
            .storage
            .put_object(&key, request.body, &request.content_type);

        match tokio::time::timeout(self.timeout, write).await {
            Ok(Ok(())) => {}
            // Reported once, where the error becomes a response.
            Ok(Err(e)) => return Err(UploadError::Storage(e)),
            Err(_) => return Err(UploadError::Timeout(self.timeout)),
        }

        info!(
            "📦 Stored {} ({} bytes, {})",
            key, size, request.content_type
        );

        let url = self
            .public_base_url
            .as_ref()
            .map(|base| format!("{}/{}", base, key));

        Ok(StoredObject { id, key, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<(String, Bytes, String)>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl StorageService for RecordingStorage {
        async fn put_object(
            &self,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> anyhow::Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(anyhow::anyhow!("AccessDenied"));
            }
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), body, content_type.to_string()));
            Ok(())
        }

        async fn check_bucket(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn request(body: &'static [u8]) -> UploadRequest {
        UploadRequest {
            body: Bytes::from_static(body),
            content_type: "image/jpeg".to_string(),
            sign: Some("abc123".to_string()),
            file_name: Some("photo.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_writes_once_under_generated_key() {
        let storage = Arc::new(RecordingStorage::default());
        let service = UploadService::new(storage.clone(), &AppConfig::development().storage);

        let stored = service.upload(request(b"jpeg bytes")).await.unwrap();

        assert_eq!(stored.key, format!("sign_{}_raw", stored.id));
        assert!(stored.url.is_none());

        let puts = storage.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, stored.key);
        assert_eq!(puts[0].1, Bytes::from_static(b"jpeg bytes"));
        assert_eq!(puts[0].2, "image/jpeg");
    }

    #[tokio::test]
    async fn test_public_url_is_built_from_key() {
        let storage = Arc::new(RecordingStorage::default());
        let mut config = AppConfig::development().storage;
        config.public_base_url = Some("https://media.example.com".to_string());
        let service = UploadService::new(storage, &config);

        let stored = service.upload(request(b"x")).await.unwrap();
        assert_eq!(
            stored.url,
            Some(format!("https://media.example.com/{}", stored.key))
        );
    }

    #[tokio::test]
    async fn test_storage_error_is_returned() {
        let storage = Arc::new(RecordingStorage {
            fail: true,
            ..Default::default()
        });
        let service = UploadService::new(storage, &AppConfig::development().storage);

        let err = service.upload(request(b"x")).await.unwrap_err();
        assert!(matches!(err, UploadError::Storage(_)));
        assert_eq!(err.to_string(), "AccessDenied");
    }

    #[tokio::test]
    async fn test_slow_storage_times_out() {
        let storage = Arc::new(RecordingStorage {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let mut config = AppConfig::development().storage;
        config.timeout = Duration::from_millis(20);
        let service = UploadService::new(storage.clone(), &config);

        let err = service.upload(request(b"x")).await.unwrap_err();
        assert!(matches!(err, UploadError::Timeout(_)));
        assert!(storage.puts.lock().unwrap().is_empty());
    }
}

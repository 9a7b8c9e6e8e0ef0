use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes `body` to `key` in a single request, tagging it with `content_type`.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    /// Confirms the configured bucket is reachable with the current credentials.
    async fn check_bucket(&self) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let size = body.len();
        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, size={}, error={:?}",
                self.bucket,
                key,
                size,
                e
            );
            return Err(anyhow!("{}", DisplayErrorContext(&e)));
        }
        Ok(())
    }

    async fn check_bucket(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

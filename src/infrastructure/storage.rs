use crate::config::StorageConfig;
use crate::services::storage::{S3StorageService, StorageService};
use aws_config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the S3 client once from validated configuration.
pub async fn setup_storage(config: &StorageConfig) -> Arc<S3StorageService> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.endpoint_url, config.bucket, config.region
    );

    // Every upload is a single attempt.
    let aws_config = aws_config::from_env()
        .endpoint_url(&config.endpoint_url)
        .region(Region::new(config.region.clone()))
        .credentials_provider(Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    let storage = S3StorageService::new(s3_client, config.bucket.clone());

    // Unreachable storage is reported but not fatal; uploads surface the
    // backend error per request.
    match tokio::time::timeout(config.timeout, storage.check_bucket()).await {
        Ok(Ok(())) => info!("✅ Bucket '{}' is ready", storage.bucket()),
        Ok(Err(e)) => warn!("⚠️  Bucket '{}' is not reachable yet: {:#}", storage.bucket(), e),
        Err(_) => warn!(
            "⚠️  Bucket '{}' check timed out after {:?}",
            storage.bucket(),
            config.timeout
        ),
    }

    Arc::new(storage)
}

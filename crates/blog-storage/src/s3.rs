//! S3 / MinIO blob store
//!
//! Objects are written under `{prefix}/{uuid}` so keys never collide and never
//! carry client-supplied names.

use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use blog_common::StorageConfig;
use blog_core::traits::{BlobStore, BlobUpload, StorageError, StoredBlob};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const BUCKET_CREATE_ATTEMPTS: u32 = 8;

/// Blob store talking to an S3 compatible endpoint
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3BlobStore {
    /// Build a client from configuration and make sure the bucket exists
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint);

        if !config.access_key.is_empty() && !config.secret_key.is_empty() {
            let creds =
                Credentials::new(&config.access_key, &config.secret_key, None, None, "static");
            loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
        }

        let shared = loader.load().await;
        // Path-style addressing: MinIO and local endpoints have no wildcard DNS
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        let store = Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.key_prefix.trim_matches('/').to_string(),
        };
        info!(endpoint = %config.endpoint, bucket = %store.bucket, "S3 client initialized");

        store.ensure_bucket().await?;
        Ok(store)
    }

    /// Create the bucket if `head_bucket` cannot see it, retrying with quadratic backoff
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let Err(head_err) = self.client.head_bucket().bucket(&self.bucket).send().await else {
            return Ok(());
        };
        warn!(
            bucket = %self.bucket,
            error = %DisplayErrorContext(&head_err),
            "head_bucket failed, creating bucket"
        );

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.client.create_bucket().bucket(&self.bucket).send().await {
                Ok(_) => {
                    info!(bucket = %self.bucket, attempt, "Bucket created");
                    return Ok(());
                }
                Err(e) if attempt >= BUCKET_CREATE_ATTEMPTS => {
                    error!(
                        bucket = %self.bucket,
                        attempt,
                        error = %DisplayErrorContext(&e),
                        "create_bucket failed"
                    );
                    return Err(StorageError::Unavailable(format!(
                        "failed to ensure bucket '{}': {e}",
                        self.bucket
                    )));
                }
                Err(e) => {
                    let backoff = Duration::from_millis(200 * u64::from(attempt.pow(2)));
                    warn!(
                        bucket = %self.bucket,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %DisplayErrorContext(&e),
                        "create_bucket failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    fn key_for(&self, id: Uuid) -> String {
        object_key(&self.prefix, id)
    }
}

fn object_key(prefix: &str, id: Uuid) -> String {
    if prefix.is_empty() {
        id.to_string()
    } else {
        format!("{prefix}/{id}")
    }
}

/// Content type from the bytes themselves, then the client hint, then a generic fallback
pub fn detect_content_type(bytes: &[u8], hint: Option<&str>) -> String {
    infer::get(bytes)
        .map(|t| t.mime_type().to_string())
        .or_else(|| hint.filter(|h| !h.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// Service responses are rejections; anything else is a transport problem
fn classify<E, R>(err: &SdkError<E, R>) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(err).to_string();
    match err {
        SdkError::ServiceError(_) => StorageError::Rejected(detail),
        _ => StorageError::Unavailable(detail),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, upload), fields(bytes = upload.len()))]
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        let key = self.key_for(Uuid::new_v4());
        let content_type = detect_content_type(&upload.bytes, upload.content_type_hint.as_deref());
        let byte_size = upload.len() as i64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&content_type)
            .body(ByteStream::from(upload.bytes))
            .send()
            .await
            .map_err(|e| {
                error!(
                    key = %key,
                    bucket = %self.bucket,
                    error = %DisplayErrorContext(&e),
                    "put_object failed"
                );
                classify(&e)
            })?;

        debug!(key = %key, content_type = %content_type, "Blob uploaded");

        Ok(StoredBlob {
            object_id: key,
            byte_size,
            content_type,
            original_name: upload.original_name,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, object_id: &str) -> Result<(), StorageError> {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_id)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().and_then(|se| se.code()) == Some("NoSuchKey") => {
                debug!(object_id, "Blob already gone");
                Ok(())
            }
            Err(e) => Err(classify(&e)),
        }
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::io::ReaderStream;

use crate::config::StorageConfig;

/// Object store holding videos, thumbnails and QR images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `body` under `key` and returns its public URL.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<String>;

    /// Streams the file at `path` to `key` without buffering it, returning its public URL.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<String>;

    async fn delete_object(&self, key: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    /// Short name recorded on each lecture, e.g. `wasabi`.
    fn provider_name(&self) -> &'static str;

    fn bucket(&self) -> &str;
}

/// Builds public object URLs for a Wasabi bucket, optionally behind a CDN.
#[derive(Debug, Clone)]
pub struct PublicUrlBuilder {
    bucket: String,
    region: String,
    cdn_url: String,
}

impl PublicUrlBuilder {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            cdn_url: config.cdn_url.clone(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        if self.cdn_url.is_empty() {
            format!("https://s3.{}.wasabisys.com/{}/{}", self.region, self.bucket, key)
        } else {
            format!("{}/{}", self.cdn_url.trim_end_matches('/'), key)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DeleteObjectRequest<'a> {
    bucket: &'a str,
    key: &'a str,
}

/// Uploads through an HTTP gateway in front of the S3-compatible bucket.
///
/// Gateway contract:
/// - `POST {gateway}/upload` multipart with `bucket`, `fullpath` and `file`
/// - `POST {gateway}/delete-file` JSON `{ bucket, key }`
#[derive(Clone)]
pub struct GatewayStorage {
    client: Client,
    base_url: String,
    urls: PublicUrlBuilder,
    bucket: String,
}

impl GatewayStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        // Large videos need a generous request timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build storage HTTP client")?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            urls: PublicUrlBuilder::from_config(config),
            bucket: config.bucket.clone(),
        })
    }
}

impl GatewayStorage {
    async fn upload_part(&self, key: &str, part: multipart::Part) -> Result<String> {
        let url = format!("{}/upload", self.base_url);
        let form = multipart::Form::new()
            .text("bucket", self.bucket.clone())
            .text("fullpath", key.to_string())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload request for {}: {}", key, e);
                anyhow::anyhow!("Upload request failed for {}: {}", key, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Upload failed for {}: {} - {}", key, status, error_text);
            anyhow::bail!("Failed to upload {}: {} - {}", key, status, error_text);
        }

        tracing::info!("Successfully uploaded object: {}", key);
        Ok(self.public_url(key))
    }
}

fn object_file_name(key: &str) -> String {
    key.rsplit('/').next().unwrap_or(key).to_string()
}

#[async_trait]
impl ObjectStorage for GatewayStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<String> {
        let size = body.len() as u64;
        tracing::info!("Uploading object {} ({} bytes, {})", key, size, content_type);

        let part = multipart::Part::stream_with_length(reqwest::Body::from(body), size)
            .file_name(object_file_name(key))
            .mime_str(content_type)?;
        self.upload_part(key, part).await
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<String> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open staged file {}", path.display()))?;
        let size = file.metadata().await?.len();
        tracing::info!("Streaming file {} to {} ({} bytes, {})", path.display(), key, size, content_type);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, size)
            .file_name(object_file_name(key))
            .mime_str(content_type)?;
        self.upload_part(key, part).await
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let url = format!("{}/delete-file", self.base_url);
        let request = DeleteObjectRequest {
            bucket: &self.bucket,
            key,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if response.status().is_success() {
            tracing::info!("Deleted object: {}", key);
            Ok(())
        } else {
            anyhow::bail!("Failed to delete {}: {}", key, response.status())
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    fn provider_name(&self) -> &'static str {
        "wasabi"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// Keeps objects in memory; used for local runs and tests.
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    urls: PublicUrlBuilder,
    bucket: String,
}

impl MemoryStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            urls: PublicUrlBuilder::from_config(config),
            bucket: config.bucket.clone(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<String> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(key))
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<String> {
        let body = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read staged file {}", path.display()))?;
        self.put_object(key, Bytes::from(body), content_type).await
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

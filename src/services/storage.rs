use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use bytes::Bytes;
use chrono::Utc;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};

/// Object storage holding formation files. Paths returned by `upload` are
/// what `formation_files.cloud_storage_path` stores.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String>;

    /// Time-limited URL for downloading the object at `path`.
    async fn download_url(&self, path: &str) -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static pattern is valid"))
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned = unsafe_chars().replace_all(name, "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "fichier".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<prefix>uploads/<millis>-<sanitized name>`
pub fn storage_key(prefix: &str, filename: &str) -> String {
    format!(
        "{}uploads/{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// S3 (or S3-compatible) backend with presigned GET URLs.
pub struct S3Storage {
    client: S3Client,
    bucket_name: String,
    folder_prefix: String,
    url_expiry_seconds: u64,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket_name: String, folder_prefix: String) -> Self {
        Self {
            client,
            bucket_name,
            folder_prefix,
            url_expiry_seconds: 3600,
        }
    }

    pub fn with_url_expiry(mut self, seconds: u64) -> Self {
        self.url_expiry_seconds = seconds;
        self
    }

    /// Builds a client from the standard AWS environment (region, credentials,
    /// optional endpoint override).
    pub async fn from_env(config: &StorageConfig) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = S3Client::new(&aws_config);
        Self::new(client, config.bucket.clone(), config.folder_prefix.clone())
            .with_url_expiry(config.signed_url_ttl_seconds)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String> {
        let key = storage_key(&self.folder_prefix, filename);

        info!(
            bucket = %self.bucket_name,
            key = %key,
            size = data.len(),
            "uploading object"
        );

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .context("Failed to upload object to S3")?;

        Ok(key)
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let presigning_config = aws_sdk_s3::presigning::PresigningConfig::builder()
            .expires_in(Duration::from_secs(self.url_expiry_seconds))
            .build()
            .context("Failed to build presigning config")?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(path)
            .presigned(presigning_config)
            .await
            .context("Failed to generate presigned URL")?;

        Ok(presigned_request.uri().to_string())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        info!(key = %path, "deleting object");

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(path)
            .send()
            .await
            .context("Failed to delete object from S3")?;

        Ok(())
    }
}

/// In-process backend for development and tests.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, (String, Bytes)>>,
    folder_prefix: String,
    url_expiry_seconds: u64,
}

impl MemoryStorage {
    pub fn new(folder_prefix: impl Into<String>, url_expiry_seconds: u64) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            folder_prefix: folder_prefix.into(),
            url_expiry_seconds,
        }
    }

    pub fn get(&self, path: &str) -> Option<(String, Bytes)> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(path).cloned())
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String> {
        let key = storage_key(&self.folder_prefix, filename);
        self.objects
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?
            .insert(key.clone(), (content_type.to_string(), data));
        Ok(key)
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let expires = Utc::now().timestamp() + self.url_expiry_seconds as i64;
        Ok(format!("memory://{}?expires={}", path, expires))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.objects
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?
            .remove(path);
        Ok(())
    }
}

pub async fn build_storage(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    match config.backend {
        StorageBackend::S3 => Arc::new(S3Storage::from_env(config).await),
        StorageBackend::Memory => Arc::new(MemoryStorage::new(
            config.folder_prefix.clone(),
            config.signed_url_ttl_seconds,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("intro.mp4"), "intro.mp4");
        assert_eq!(sanitize_filename("Cours n°1 (final).pdf"), "Cours_n_1_final_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("***"), "fichier");
    }

    #[test]
    fn test_storage_key_layout() {
        let key = storage_key("academy/", "vidéo.mp4");
        assert!(key.starts_with("academy/uploads/"));
        assert!(key.ends_with("-vid_o.mp4"));
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new("", 3600);
        let path = storage
            .upload(Bytes::from_static(b"%PDF"), "guide.pdf", "application/pdf")
            .await
            .unwrap();

        let (content_type, data) = storage.get(&path).unwrap();
        assert_eq!(content_type, "application/pdf");
        assert_eq!(&data[..], b"%PDF");

        let url = storage.download_url(&path).await.unwrap();
        assert!(url.starts_with(&format!("memory://{}?expires=", path)));

        storage.delete(&path).await.unwrap();
        assert!(storage.is_empty());
    }
}

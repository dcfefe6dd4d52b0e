//! Object-store backend capability.
//!
//! The gateway talks to storage exclusively through the [`ObjectStore`]
//! trait: a streaming put, a download-to-file, and the two provisioning
//! calls. `S3Store` is the production implementation over an S3-compatible
//! endpoint (MinIO included); `MemoryStore` substitutes for it in tests and
//! local development without a network dependency.

use crate::config::AppConfig;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use s3::{Bucket, BucketConfiguration, creds::Credentials, error::S3Error, region::Region};
use std::{collections::HashMap, io, path::Path, sync::Arc};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("backend returned status {0}")]
    UnexpectedStatus(u16),
    #[error(transparent)]
    S3(#[from] S3Error),
    #[error(transparent)]
    Credentials(#[from] s3::creds::error::CredentialsError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow capability interface over the storage backend.
///
/// `put_stream` is a single unbuffered write: the total length is not known
/// upfront and the backend determines it from the stream itself. A put to an
/// existing key overwrites unconditionally.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream an object body into the bucket under `key`. Returns the number
    /// of bytes written.
    async fn put_stream(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        content_type: &str,
    ) -> StoreResult<u64>;

    /// Download an object into a local file at `dest`.
    async fn get_to_file(&self, key: &str, dest: &Path) -> StoreResult<()>;

    /// Whether the configured bucket exists.
    async fn bucket_exists(&self) -> StoreResult<bool>;

    /// Create the configured bucket.
    async fn make_bucket(&self) -> StoreResult<()>;
}

/// Provision the backing bucket once at startup.
///
/// "Already exists" is success: if creation fails but the bucket turns out to
/// exist (raced or owned by us), the original creation error is swallowed.
/// Any other failure is surfaced and treated as fatal by the caller.
pub async fn ensure_bucket(store: &dyn ObjectStore) -> StoreResult<()> {
    if store.bucket_exists().await? {
        debug!("bucket already provisioned");
        return Ok(());
    }
    match store.make_bucket().await {
        Ok(()) => {
            info!("created storage bucket");
            Ok(())
        }
        Err(err) => match store.bucket_exists().await {
            Ok(true) => {
                debug!("bucket appeared concurrently, treating as provisioned");
                Ok(())
            }
            _ => Err(err),
        },
    }
}

/// S3-compatible backend over `rust-s3`.
///
/// Uses a custom region endpoint with path-style addressing and static
/// credentials, which is the wiring MinIO expects.
#[derive(Clone)]
pub struct S3Store {
    bucket: Bucket,
    region: Region,
    credentials: Credentials,
}

impl S3Store {
    pub fn connect(cfg: &AppConfig) -> StoreResult<Self> {
        let region = Region::Custom {
            region: cfg.s3_region.clone(),
            endpoint: cfg.s3_endpoint_url(),
        };
        let credentials = Credentials::new(
            Some(&cfg.s3_access_key),
            Some(&cfg.s3_secret_key),
            None,
            None,
            None,
        )?;
        let bucket =
            Bucket::new(&cfg.s3_bucket, region.clone(), credentials.clone())?.with_path_style();
        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_stream(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        content_type: &str,
    ) -> StoreResult<u64> {
        let mut reader = reader;
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await?;
        match response.status_code() {
            200..=299 => Ok(response.uploaded_bytes() as u64),
            code => Err(StoreError::UnexpectedStatus(code)),
        }
    }

    async fn get_to_file(&self, key: &str, dest: &Path) -> StoreResult<()> {
        let mut file = tokio::fs::File::create(dest).await?;
        let status = match self.bucket.get_object_to_writer(key, &mut file).await {
            Ok(status) => status,
            Err(S3Error::HttpFailWithBody(404, _)) => {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(StoreError::ObjectNotFound(key.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        if !(200..300).contains(&status) {
            return Err(StoreError::UnexpectedStatus(status));
        }
        file.flush().await?;
        Ok(())
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        Ok(self.bucket.exists().await?)
    }

    async fn make_bucket(&self) -> StoreResult<()> {
        let response = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await?;
        if !response.success() {
            return Err(StoreError::UnexpectedStatus(response.response_code));
        }
        Ok(())
    }
}

/// A stored blob held by [`MemoryStore`].
#[derive(Clone, Debug)]
pub struct StoredBlob {
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Default)]
struct MemoryInner {
    provisioned: bool,
    objects: HashMap<String, StoredBlob>,
}

/// In-memory backend for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored blob by its full object key.
    pub fn blob(&self, key: &str) -> Option<StoredBlob> {
        self.inner.lock().objects.get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().objects.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_stream(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        content_type: &str,
    ) -> StoreResult<u64> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let written = data.len() as u64;
        self.inner.lock().objects.insert(
            key.to_string(),
            StoredBlob {
                content_type: content_type.to_string(),
                data: Bytes::from(data),
            },
        );
        Ok(written)
    }

    async fn get_to_file(&self, key: &str, dest: &Path) -> StoreResult<()> {
        let blob = self
            .blob(key)
            .ok_or_else(|| StoreError::ObjectNotFound(key.to_string()))?;
        tokio::fs::write(dest, &blob.data).await?;
        Ok(())
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        Ok(self.inner.lock().provisioned)
    }

    async fn make_bucket(&self) -> StoreResult<()> {
        self.inner.lock().provisioned = true;
        Ok(())
    }
}

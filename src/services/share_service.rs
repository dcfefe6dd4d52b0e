//! Upload gateway: draws a key, streams the inbound file to the backend, and
//! answers with either the stored key or a ready-to-use share link.

use crate::services::{
    key_service::KeyGenerator,
    link_service::LinkResolver,
    object_store::{ObjectStore, StoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("multipart form is missing the `file` field")]
    MissingFile,
    #[error("storage write failed")]
    StorageWriteFailed(#[source] StoreError),
}

/// What a successful upload hands back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The full object key (`prefix + key`), for clients that resolve links
    /// themselves later.
    Key(String),
    /// A fully qualified share link, when the client asked for one upfront.
    Link(String),
}

/// Core gateway service, shared as router state.
#[derive(Clone)]
pub struct ShareService {
    pub store: Arc<dyn ObjectStore>,
    pub keys: KeyGenerator,
    pub links: LinkResolver,
}

impl ShareService {
    pub fn new(store: Arc<dyn ObjectStore>, keys: KeyGenerator, links: LinkResolver) -> Self {
        Self { store, keys, links }
    }

    /// Store one uploaded file under a freshly generated key.
    ///
    /// Exactly one unconditional streaming put per call: a key collision
    /// silently overwrites, and a write failure is terminal for the request
    /// with no retry. The storage cause is logged here; callers surface an
    /// opaque error.
    pub async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        content_type: &str,
        sharing: bool,
    ) -> Result<UploadOutcome, UploadError> {
        let key = self.keys.generate();
        let object_key = self.links.object_key(&key);

        let written = match self.store.put_stream(&object_key, reader, content_type).await {
            Ok(written) => written,
            Err(err) => {
                tracing::error!(key = %object_key, "storage write failed: {err}");
                return Err(UploadError::StorageWriteFailed(err));
            }
        };
        tracing::info!(key = %object_key, bytes = written, "stored uploaded object");

        if sharing {
            Ok(UploadOutcome::Link(self.links.share_link(&key)))
        } else {
            Ok(UploadOutcome::Key(object_key))
        }
    }
}

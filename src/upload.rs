//! Uploading local files and byte buffers to the remote files service.

use crate::mime;
use crate::models::UploadedResource;
use crate::transport::UploadTransport;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Uploads content once and hands out reusable [`UploadedResource`]s.
///
/// Local files are remembered by canonical path and media type, so asking for
/// the same file twice in one process reuses the first URI. Raw byte uploads are never
/// deduplicated.
pub struct UploadManager {
    transport: Arc<dyn UploadTransport>,
    uploaded: Mutex<HashMap<(PathBuf, String), UploadedResource>>,
}

fn upload_error(e: Error) -> Error {
    match e {
        Error::Upload(_) => e,
        other => Error::Upload(format!("remote rejected upload: {}", other)),
    }
}

impl UploadManager {
    pub fn new(transport: Arc<dyn UploadTransport>) -> Self {
        Self {
            transport,
            uploaded: Mutex::new(HashMap::new()),
        }
    }

    /// Upload a local file, inferring its media type from the extension.
    pub async fn upload_path(&self, path: impl AsRef<Path>) -> Result<UploadedResource> {
        let path = path.as_ref();
        self.upload_path_inner(path, mime::media_type_for_path(path)).await
    }

    /// Upload a local file with an explicit media type.
    pub async fn upload_path_as(
        &self,
        path: impl AsRef<Path>,
        media_type: &str,
    ) -> Result<UploadedResource> {
        self.upload_path_inner(path.as_ref(), media_type).await
    }

    async fn upload_path_inner(&self, path: &Path, media_type: &str) -> Result<UploadedResource> {
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| Error::Upload(format!("cannot read {}: {}", path.display(), e)))?;

        let key = (canonical, media_type.to_string());
        if let Some(existing) = self.cached(&key) {
            tracing::debug!("Reusing upload of {} at {}", path.display(), existing.uri);
            return Ok(existing);
        }

        let data = tokio::fs::read(&key.0)
            .await
            .map_err(|e| Error::Upload(format!("cannot read {}: {}", path.display(), e)))?;

        let display_name = key.0.file_name().and_then(|n| n.to_str());
        let resource = self
            .transport
            .upload(data, media_type, display_name)
            .await
            .map_err(upload_error)?;

        tracing::info!("Uploaded {} as {}", path.display(), resource.uri);

        self.uploaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, resource.clone());
        Ok(resource)
    }

    fn cached(&self, key: &(PathBuf, String)) -> Option<UploadedResource> {
        self.uploaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Upload an in-memory buffer for callers without a path.
    pub async fn upload_bytes(&self, data: Vec<u8>, media_type: &str) -> Result<UploadedResource> {
        let size = data.len();
        let resource = self
            .transport
            .upload(data, media_type, None)
            .await
            .map_err(upload_error)?;

        tracing::info!("Uploaded {} bytes as {}", size, resource.uri);
        Ok(resource)
    }
}

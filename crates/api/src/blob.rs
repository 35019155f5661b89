//! Blob storage for uploaded reference videos.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use content_engine_core::hashing::sha256_hex;
use serde::Serialize;

use crate::config::BlobConfig;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored blob and the public URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
    pub content_type: String,
    pub size: u64,
    /// SHA-256 hex digest of the stored bytes.
    pub checksum: String,
}

/// Write-once public object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `pathname`, replacing anything already there.
    async fn put(
        &self,
        pathname: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, BlobError>;
}

/// Stores blobs on the local filesystem under a root directory. The router
/// serves that directory at `/blobs`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(config: &BlobConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        pathname: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, BlobError> {
        validate_pathname(pathname)?;
        let dest = self.root.join(pathname);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, bytes).await?;

        tracing::debug!(path = %dest.display(), size = bytes.len(), "Stored blob");
        Ok(StoredBlob {
            url: format!("{}/{pathname}", self.public_base_url),
            pathname: pathname.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            checksum: sha256_hex(bytes),
        })
    }
}

/// Relative, slash-separated, no empty or dot segments.
fn validate_pathname(pathname: &str) -> Result<(), BlobError> {
    let bad_segment = pathname
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\'));
    if pathname.is_empty() || bad_segment {
        return Err(BlobError::InvalidPath(pathname.to_string()));
    }
    Ok(())
}

/// Blob path for a project's reference video. The extension comes from the
/// uploaded filename and defaults to `mp4`.
pub fn reference_video_path(project_id: &str, filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "mp4".to_string());
    format!("projects/{project_id}/reference.{ext}")
}

//! Object storage for uploaded file bytes

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

/// Errors from storing a blob
#[derive(Debug)]
pub enum BlobStoreError {
    InvalidName(String),
    Io(std::io::Error),
}

impl fmt::Display for BlobStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "Invalid blob name: {name:?}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for BlobStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobStoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Stores uploaded bytes and returns the URL they are reachable at
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, BlobStoreError>;
}

/// Blob store writing content-addressed files into a local directory
pub struct FsBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(dir: PathBuf, public_base_url: &str) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ensure the blob directory exists
    pub async fn init(&self) -> Result<(), BlobStoreError> {
        fs::create_dir_all(&self.dir).await?;
        info!(blob_dir = ?self.dir, "Blob store initialized");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build the storage key `<sha256 prefix>-<base name>`
    fn blob_key(name: &str, bytes: &[u8]) -> Result<String, BlobStoreError> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
        if base.is_empty() || base == "." || base == ".." {
            return Err(BlobStoreError::InvalidName(name.to_string()));
        }

        let digest = hex::encode(Sha256::digest(bytes));
        Ok(format!("{}-{}", &digest[..16], base))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, BlobStoreError> {
        let key = Self::blob_key(name, bytes)?;
        fs::write(self.dir.join(&key), bytes).await?;
        debug!(key = %key, content_type, size = bytes.len(), "Stored blob");

        Ok(format!(
            "{}/{}",
            self.public_base_url,
            urlencoding::encode(&key)
        ))
    }
}

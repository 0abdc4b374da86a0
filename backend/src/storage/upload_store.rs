use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File too large ({size} bytes, limit {limit})")]
    FileTooLarge { size: usize, limit: usize },
}

/// Working directory for uploaded videos awaiting analysis.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
    max_size: usize,
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub key: String,
    pub path: PathBuf,
    pub size: usize,
    pub content_hash: String,
}

impl UploadStore {
    /// Creates the root directory if needed and resolves it to an absolute path,
    /// since stored paths are handed to the detector process.
    pub fn open(root: impl AsRef<Path>, max_size: usize) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root.as_ref())?;
        let root = std::fs::canonicalize(root.as_ref())?;
        Ok(Self { root, max_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn calculate_content_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Storage key for one request. The client's file name only contributes its extension.
    pub fn generate_key(id: Uuid, file_name: &str) -> String {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        format!("{}.{}", id, extension)
    }

    pub fn validate_size(&self, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > self.max_size {
            return Err(StorageError::FileTooLarge {
                size: data.len(),
                limit: self.max_size,
            });
        }
        Ok(())
    }

    pub async fn store(
        &self,
        id: Uuid,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredUpload, StorageError> {
        self.validate_size(data)?;

        let key = Self::generate_key(id, file_name);
        let path = self.root.join(&key);
        if let Err(e) = tokio::fs::write(&path, data).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        let stored = StoredUpload {
            key,
            path,
            size: data.len(),
            content_hash: Self::calculate_content_hash(data),
        };
        log::debug!(
            "Stored upload '{}' as {} ({} bytes, sha256 {})",
            file_name,
            stored.key,
            stored.size,
            stored.content_hash
        );
        Ok(stored)
    }

    pub async fn remove(&self, stored: &StoredUpload) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&stored.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

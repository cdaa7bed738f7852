use serde::Deserialize;
use std::path::PathBuf;

use crate::filesystem::FilesystemBlobStore;

#[derive(Debug, Clone, Deserialize)]
pub struct BlobStorageConfig {
    /// Root directory for blob payloads and in-flight uploads.
    pub root_dir: PathBuf,
}

impl BlobStorageConfig {
    pub fn store(&self) -> FilesystemBlobStore {
        FilesystemBlobStore::new(self.root_dir.clone())
    }
}

//! services/api/src/adapters/file_storage.rs
//!
//! This module contains the local file storage adapter, the concrete
//! implementation of the `RecordStorage` port. Each key maps to one JSON file
//! inside the storage directory.

use async_trait::async_trait;
use seo_booster_core::ports::{PortError, PortResult, RecordStorage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that keeps each record in `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileRecordStorage {
    dir: PathBuf,
}

impl FileRecordStorage {
    /// Creates the adapter, making sure the directory exists.
    pub async fn new(dir: impl Into<PathBuf>) -> PortResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            PortError::Unexpected(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

//=========================================================================================
// `RecordStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStorage for FileRecordStorage {
    async fn read(&self, key: &str) -> PortResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    /// Writes to a sibling temp file first and renames it over the target,
    /// so a crash mid-write never leaves a truncated record behind.
    async fn write(&self, key: &str, bytes: &[u8]) -> PortResult<()> {
        let target = self.path_for(key);
        let staging = self.dir.join(format!("{}.json.tmp", key));

        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(path = %target.display(), "Record written");
        Ok(())
    }
}

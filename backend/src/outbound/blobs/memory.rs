//! In-memory blob store with write accounting for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{BlobLocation, BlobStore, BlobStoreError};

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobLocation, BTreeMap<String, Vec<u8>>>>,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// File names currently held in `location`.
    pub async fn file_names(&self, location: &BlobLocation) -> Vec<String> {
        self.blobs
            .read()
            .await
            .get(location)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(
        &self,
        location: &BlobLocation,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        self.blobs
            .write()
            .await
            .entry(location.clone())
            .or_default()
            .insert(file_name.to_owned(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(
        &self,
        location: &BlobLocation,
        file_name: &str,
    ) -> Result<Option<Vec<u8>>, BlobStoreError> {
        Ok(self
            .blobs
            .read()
            .await
            .get(location)
            .and_then(|files| files.get(file_name))
            .cloned())
    }

    async fn prune(&self, location: &BlobLocation, keep: &str) -> Result<(), BlobStoreError> {
        if let Some(files) = self.blobs.write().await.get_mut(location) {
            files.retain(|name, _| name == keep);
        }
        Ok(())
    }
}

//! In-memory document store for tests and ephemeral deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Collection, DocumentStore, DocumentStoreError};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(Collection, String), Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Vec<u8>>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(collection, key.to_owned())).cloned())
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError> {
        let mut documents = self.documents.write().await;
        let slot = (collection, key.to_owned());
        if documents.contains_key(&slot) {
            return Ok(false);
        }
        documents.insert(slot, document.to_vec());
        Ok(true)
    }

    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&(collection, key.to_owned())) {
            Some(existing) => {
                *existing = document.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Vec<u8>>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|((owner, _), _)| *owner == collection)
            .map(|(_, document)| document.clone())
            .collect())
    }
}

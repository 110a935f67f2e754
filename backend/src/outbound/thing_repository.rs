//! Thing repository over a document store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{ThingRepository, ThingRepositoryError};
use crate::domain::{Thing, ThingId};
use crate::outbound::documents::{Collection, DocumentStore, DocumentStoreError};

/// Things serialised as JSON documents keyed by identifier.
#[derive(Clone)]
pub struct DocumentThingRepository {
    documents: Arc<dyn DocumentStore>,
}

impl DocumentThingRepository {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

fn map_error(error: DocumentStoreError) -> ThingRepositoryError {
    match error {
        DocumentStoreError::Unavailable { message } => ThingRepositoryError::connection(message),
        other => ThingRepositoryError::query(other.to_string()),
    }
}

fn decode(bytes: &[u8]) -> Result<Thing, ThingRepositoryError> {
    serde_json::from_slice(bytes)
        .map_err(|error| ThingRepositoryError::query(format!("corrupt thing record: {error}")))
}

fn encode(thing: &Thing) -> Result<Vec<u8>, ThingRepositoryError> {
    serde_json::to_vec(thing)
        .map_err(|error| ThingRepositoryError::query(format!("encode thing: {error}")))
}

#[async_trait]
impl ThingRepository for DocumentThingRepository {
    async fn find(&self, id: &ThingId) -> Result<Option<Thing>, ThingRepositoryError> {
        self.documents
            .find(Collection::Things, id.as_ref())
            .await
            .map_err(map_error)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    async fn insert_if_absent(&self, thing: &Thing) -> Result<(), ThingRepositoryError> {
        let inserted = self
            .documents
            .insert_if_absent(Collection::Things, thing.id().as_ref(), &encode(thing)?)
            .await
            .map_err(map_error)?;
        if inserted {
            Ok(())
        } else {
            Err(ThingRepositoryError::already_exists(thing.id().as_ref()))
        }
    }

    async fn replace(&self, thing: &Thing) -> Result<(), ThingRepositoryError> {
        let replaced = self
            .documents
            .replace(Collection::Things, thing.id().as_ref(), &encode(thing)?)
            .await
            .map_err(map_error)?;
        if replaced {
            Ok(())
        } else {
            Err(ThingRepositoryError::missing(thing.id().as_ref()))
        }
    }

    async fn list(&self) -> Result<Vec<Thing>, ThingRepositoryError> {
        let mut things = self
            .documents
            .list(Collection::Things)
            .await
            .map_err(map_error)?
            .iter()
            .map(|bytes| decode(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        things.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(things)
    }
}

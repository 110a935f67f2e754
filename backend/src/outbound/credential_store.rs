//! Credential store over a document store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{Identity, User, Verifier};
use crate::outbound::documents::{Collection, DocumentStore, DocumentStoreError};

/// Users serialised as JSON documents keyed by identity.
#[derive(Clone)]
pub struct DocumentCredentialStore {
    documents: Arc<dyn DocumentStore>,
}

impl DocumentCredentialStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

fn map_error(error: DocumentStoreError) -> CredentialStoreError {
    match error {
        DocumentStoreError::Unavailable { message } => CredentialStoreError::connection(message),
        other => CredentialStoreError::query(other.to_string()),
    }
}

fn decode(bytes: &[u8]) -> Result<User, CredentialStoreError> {
    serde_json::from_slice(bytes)
        .map_err(|error| CredentialStoreError::query(format!("corrupt user record: {error}")))
}

#[async_trait]
impl CredentialStore for DocumentCredentialStore {
    async fn find(&self, identity: &Identity) -> Result<Option<User>, CredentialStoreError> {
        self.documents
            .find(Collection::Users, identity.as_ref())
            .await
            .map_err(map_error)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    async fn find_by_verifier(
        &self,
        verifier: &Verifier,
    ) -> Result<Option<User>, CredentialStoreError> {
        let documents = self
            .documents
            .list(Collection::Users)
            .await
            .map_err(map_error)?;
        for bytes in documents {
            let user = decode(&bytes)?;
            if user.verifier() == verifier {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    async fn insert_if_absent(&self, user: &User) -> Result<(), CredentialStoreError> {
        let bytes = serde_json::to_vec(user)
            .map_err(|error| CredentialStoreError::query(format!("encode user: {error}")))?;
        let inserted = self
            .documents
            .insert_if_absent(Collection::Users, user.identity().as_ref(), &bytes)
            .await
            .map_err(map_error)?;
        if inserted {
            Ok(())
        } else {
            Err(CredentialStoreError::already_exists(user.identity().as_ref()))
        }
    }
}

//! Driven port for user persistence.

use async_trait::async_trait;

use crate::domain::{Identity, Rejection, User, Verifier};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// A user with this identity already exists.
        AlreadyExists { identity: String } => "identity {identity} already exists",
        /// The backing store could not be reached.
        Connection { message: String } => "credential store connection failed: {message}",
        /// A read or write failed.
        Query { message: String } => "credential store query failed: {message}",
    }
}

impl From<CredentialStoreError> for Rejection {
    fn from(error: CredentialStoreError) -> Self {
        match error {
            CredentialStoreError::Connection { .. } => Rejection::unavailable(error.to_string()),
            other => Rejection::storage(other.to_string()),
        }
    }
}

/// Authoritative store of registered users.
///
/// Implementations must make [`CredentialStore::insert_if_absent`] atomic per
/// identity: two concurrent inserts of the same identity yield exactly one
/// success.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user by identity.
    async fn find(&self, identity: &Identity) -> Result<Option<User>, CredentialStoreError>;

    /// Fetch the user whose stored verifier equals `verifier`.
    async fn find_by_verifier(
        &self,
        verifier: &Verifier,
    ) -> Result<Option<User>, CredentialStoreError>;

    /// Store `user` unless its identity is taken.
    async fn insert_if_absent(&self, user: &User) -> Result<(), CredentialStoreError>;
}

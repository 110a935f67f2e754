//! Driven port for thing persistence.

use async_trait::async_trait;

use crate::domain::{Rejection, Thing, ThingId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by thing repository adapters.
    pub enum ThingRepositoryError {
        /// A record already exists under the identifier.
        AlreadyExists { thing_id: String } => "thing {thing_id} already exists",
        /// No record exists under the identifier.
        Missing { thing_id: String } => "thing {thing_id} does not exist",
        /// The backing store could not be reached.
        Connection { message: String } => "thing repository connection failed: {message}",
        /// A read or write failed.
        Query { message: String } => "thing repository query failed: {message}",
    }
}

impl From<ThingRepositoryError> for Rejection {
    fn from(error: ThingRepositoryError) -> Self {
        match error {
            ThingRepositoryError::Connection { .. } => Rejection::unavailable(error.to_string()),
            other => Rejection::storage(other.to_string()),
        }
    }
}

/// Authoritative store of thing records.
///
/// `insert_if_absent` must be atomic per identifier; `replace` only
/// overwrites an existing record.
#[async_trait]
pub trait ThingRepository: Send + Sync {
    async fn find(&self, id: &ThingId) -> Result<Option<Thing>, ThingRepositoryError>;

    async fn insert_if_absent(&self, thing: &Thing) -> Result<(), ThingRepositoryError>;

    async fn replace(&self, thing: &Thing) -> Result<(), ThingRepositoryError>;

    /// Every stored thing, oldest first.
    async fn list(&self) -> Result<Vec<Thing>, ThingRepositoryError>;
}

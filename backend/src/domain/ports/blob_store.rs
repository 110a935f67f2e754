//! Driven port for artifact bytes.

use async_trait::async_trait;

use crate::domain::{ArtifactKind, Rejection, ThingId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The file name cannot be used as a storage path.
        InvalidName { name: String } => "invalid blob name: {name}",
        /// The backing store could not be reached.
        Unavailable { message: String } => "blob store unavailable: {message}",
        /// A read or write failed.
        Io { message: String } => "blob store i/o failed: {message}",
    }
}

impl From<BlobStoreError> for Rejection {
    fn from(error: BlobStoreError) -> Self {
        match error {
            BlobStoreError::Unavailable { .. } => Rejection::unavailable(error.to_string()),
            other => Rejection::storage(other.to_string()),
        }
    }
}

/// One storage location per thing and artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation {
    pub thing_id: ThingId,
    pub kind: ArtifactKind,
}

impl BlobLocation {
    pub fn new(thing_id: ThingId, kind: ArtifactKind) -> Self {
        Self { thing_id, kind }
    }
}

/// Out-of-line storage for artifact payloads.
///
/// Writes never remove other files in the location; callers prune stale
/// files once the new file is referenced.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` as `file_name` in `location`.
    async fn write(
        &self,
        location: &BlobLocation,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError>;

    /// Read `file_name` from `location`; `None` when nothing is stored.
    async fn read(
        &self,
        location: &BlobLocation,
        file_name: &str,
    ) -> Result<Option<Vec<u8>>, BlobStoreError>;

    /// Remove every file in `location` except `keep`.
    async fn prune(&self, location: &BlobLocation, keep: &str) -> Result<(), BlobStoreError>;
}

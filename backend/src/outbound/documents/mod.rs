//! Keyed document storage backing the credential store and thing repository.
//!
//! Documents are opaque JSON bytes grouped in collections. Adapters only
//! promise per-key atomicity for [`DocumentStore::insert_if_absent`] and
//! [`DocumentStore::replace`]; ordering across keys is unspecified.

mod fs;
mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::domain::ports::define_port_error;

pub use fs::FsDocumentStore;
pub use memory::MemoryDocumentStore;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The key cannot be used as a document name.
        InvalidKey { key: String } => "invalid document key: {key}",
        /// The backing store could not be reached.
        Unavailable { message: String } => "document store unavailable: {message}",
        /// A read or write failed.
        Io { message: String } => "document store i/o failed: {message}",
    }
}

/// Document groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Things,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Things => "things",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-key atomic document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Vec<u8>>, DocumentStoreError>;

    /// Store `document` unless `key` exists. Returns false when it did.
    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError>;

    /// Overwrite an existing document. Returns false when `key` is absent.
    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError>;

    /// Every document in `collection`, in no particular order.
    async fn list(&self, collection: Collection) -> Result<Vec<Vec<u8>>, DocumentStoreError>;
}

/// Keys double as file names, so only a conservative character set is allowed.
pub(crate) fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

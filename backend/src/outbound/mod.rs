//! Outbound adapters implementing domain ports.
//!
//! - **documents**: keyed JSON document storage (memory and filesystem).
//! - **credential_store** / **thing_repository**: driven ports over documents.
//! - **blobs**: artifact byte storage (memory and filesystem).
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no business logic.

pub mod blobs;
pub mod credential_store;
pub mod documents;
pub mod thing_repository;

pub use blobs::{FsBlobStore, MemoryBlobStore};
pub use credential_store::DocumentCredentialStore;
pub use documents::{Collection, DocumentStore, DocumentStoreError, FsDocumentStore, MemoryDocumentStore};
pub use thing_repository::DocumentThingRepository;

//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`CredentialStore`, `ThingRepository`, `BlobStore`) are
//! implemented by outbound adapters. Driving ports (`Authenticator`,
//! `ThingCommand`, `ThingQuery`, `ArtifactCommand`, `ArtifactQuery`) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod artifact_command;
mod artifact_query;
mod authenticator;
mod blob_store;
mod credential_store;
mod thing_command;
mod thing_query;
mod thing_repository;

pub use artifact_command::{ArtifactCommand, SourceFileUpload};
pub use artifact_query::{ArtifactBytes, ArtifactQuery};
pub use authenticator::{Authenticator, RegistrationRequest};
pub use blob_store::{BlobLocation, BlobStore, BlobStoreError};
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use thing_command::{SubmitAction, SubmitOutcome, ThingCommand, ThingSubmission};
pub use thing_query::ThingQuery;
pub use thing_repository::{ThingRepository, ThingRepositoryError};

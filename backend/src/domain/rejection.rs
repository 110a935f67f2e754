//! Failure taxonomy shared by the domain services.
//!
//! Every validation and authorisation failure is detected before a mutation
//! and short-circuits the request. Inbound adapters convert a [`Rejection`]
//! into the transport [`Error`] payload; the domain keeps finer distinctions
//! (for example a missing thing versus a missing artifact) that collapse to
//! the same status code on the wire.

use serde_json::json;
use tracing::error;

use super::{ArtifactKind, Error, Identity, ThingId};

/// A single payload constraint violation reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer (or field name) of the offending value.
    pub field: String,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl Violation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// Reasons a request is refused by the domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The caller's payload breaks a structural or domain constraint.
    #[error("{}", .0.message)]
    PayloadInvalid(Violation),
    /// A validation schema shipped with the service is itself broken.
    #[error("validation schema {schema} is defective")]
    SchemaDefect { schema: &'static str },
    /// The presented credential could not be verified.
    #[error("authentication failed")]
    AuthenticationFailure,
    /// Credentials were presented over an insecure transport.
    #[error("credentials must be sent over a secure connection")]
    InsecureTransport,
    /// Registration is switched off by configuration.
    #[error("registration is disabled")]
    RegistrationDisabled,
    /// The identity is already registered.
    #[error("identity {identity} is already registered")]
    Conflict { identity: Identity },
    /// The acting identity does not own the targeted thing.
    #[error("thing {thing_id} is owned by another user")]
    OwnershipViolation { thing_id: ThingId },
    /// No thing exists under the identifier.
    #[error("no thing with id {thing_id} found")]
    ThingNotFound { thing_id: String },
    /// The thing exists but has no artifact of this kind.
    #[error("thing {thing_id} has no {kind} artifact")]
    ArtifactNotFound { thing_id: ThingId, kind: ArtifactKind },
    /// A backing store failed.
    #[error("storage failure: {message}")]
    Storage { message: String },
    /// A backing store is temporarily unreachable.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

impl Rejection {
    /// Shorthand for [`Rejection::PayloadInvalid`].
    pub fn invalid(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self::PayloadInvalid(Violation::new(field, code, message))
    }

    /// Shorthand for [`Rejection::Storage`].
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Shorthand for [`Rejection::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        let message = rejection.to_string();
        match rejection {
            Rejection::PayloadInvalid(violation) => Error::invalid_request(message).with_details(
                json!({ "field": violation.field, "code": violation.code }),
            ),
            Rejection::SchemaDefect { .. } => Error::invalid_request("request could not be validated"),
            Rejection::AuthenticationFailure => Error::unauthorized(message),
            Rejection::InsecureTransport | Rejection::RegistrationDisabled => Error::forbidden(message),
            Rejection::OwnershipViolation { thing_id } => Error::forbidden(message)
                .with_details(json!({ "code": "ownership_violation", "thingId": thing_id })),
            Rejection::Conflict { identity } => Error::conflict(message)
                .with_details(json!({ "code": "identity_taken", "identity": identity })),
            Rejection::ThingNotFound { thing_id } => Error::not_found(message)
                .with_details(json!({ "code": "thing_not_found", "thingId": thing_id })),
            Rejection::ArtifactNotFound { thing_id, kind } => Error::not_found(message)
                .with_details(json!({
                    "code": "artifact_not_found",
                    "thingId": thing_id,
                    "kind": kind,
                })),
            Rejection::Storage { .. } => {
                error!(error = %message, "storage failure surfaced to caller");
                Error::internal(message)
            }
            Rejection::Unavailable { .. } => Error::service_unavailable("storage is unavailable"),
        }
    }
}

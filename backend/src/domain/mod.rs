//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed entities of the thing repository and
//! the services that enforce its rules: identity establishment, the
//! ownership gate on every mutation, the validation pipeline that runs
//! before any state change, and the artifact storage contract.
//!
//! Public surface:
//! - `Identity`, `Email`, `User`, `Verifier`: registered accounts.
//! - `ThingId`, `Thing`, `ArtifactKind`, `ArtifactRef`, `ViewData`: records.
//! - `Rejection`, `Violation`: domain failure taxonomy.
//! - `Error`, `ErrorCode`: transport-agnostic error payload.
//! - `SchemaValidator`, `LicenseRegistry`, `sanitize_text`: validation.
//! - `AuthService`, `ThingService`, `ArtifactService`: driving port
//!   implementations.

pub mod artifact_service;
pub mod auth;
pub mod error;
pub mod keyed_lock;
pub mod license;
pub mod ports;
pub mod rejection;
pub mod sanitize;
pub mod schema;
pub mod thing;
pub mod thing_service;
pub mod trace_id;
pub mod user;
pub mod view_data;

pub use self::artifact_service::{ArtifactService, SOURCE_FILE_EXTENSIONS, sanitize_file_name};
pub use self::auth::{
    AuthService, AuthSettings, AuthSetupError, AuthStrategy, Credential,
    CredentialValidationError, OneTimeSecret, PasswordStrategy, Registration, TokenStrategy,
    Transport,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::keyed_lock::{KeyGuard, KeyedLocks};
pub use self::license::{BUILTIN_LICENSES, LicenseRegistry};
pub use self::rejection::{Rejection, Violation};
pub use self::sanitize::sanitize_text;
pub use self::schema::{SchemaCompileError, SchemaRef, SchemaValidator, ValidationOutcome};
pub use self::thing::{ArtifactKind, ArtifactRef, InvalidThingId, Thing, ThingId, ThingMetadata};
pub use self::thing_service::ThingService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, Identity, User, UserValidationError, Verifier};
pub use self::view_data::{Camera, ViewData};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use cadinet::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

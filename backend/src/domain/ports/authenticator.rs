//! Driving port for registration and credential verification.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    Credential, Identity, Registration, Rejection, SchemaRef, SchemaValidator, Transport,
};

/// Registration payload after structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    pub identity: String,
    pub email: String,
}

impl RegistrationRequest {
    /// Validate `payload` against the registration schema and decode it.
    pub fn parse(validator: &SchemaValidator, payload: &Value) -> Result<Self, Rejection> {
        validator.validate(payload, SchemaRef::Registration)?;
        serde_json::from_value(payload.clone())
            .map_err(|error| Rejection::invalid("/", "malformed", error.to_string()))
    }
}

/// Domain use-case port for identity establishment.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether `register` can succeed at all. Callers check this before
    /// inspecting the payload so a closed registration fails the same way
    /// for every input.
    fn registration_open(&self) -> bool;

    /// Create an account and issue its one-time secret.
    async fn register(
        &self,
        request: RegistrationRequest,
        transport: Transport,
    ) -> Result<Registration, Rejection>;

    /// Verify `credential` and return the canonical identity.
    async fn authenticate(
        &self,
        credential: &Credential,
        transport: Transport,
    ) -> Result<Identity, Rejection>;
}

//! Driving port for creating and updating things.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Identity, Rejection, SchemaRef, SchemaValidator, Thing};

/// Thing metadata as submitted, after structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ThingSubmission {
    #[schema(example = "11111111-1111-1111-1111-111111111111")]
    pub id: String,
    #[schema(example = "Shelf bracket")]
    pub title: String,
    pub description: String,
    #[schema(example = "MIT")]
    pub license: String,
    #[schema(example = "http://opensource.org/licenses/MIT")]
    pub license_url: String,
}

impl ThingSubmission {
    /// Validate `payload` against the submission schema and decode it.
    pub fn parse(validator: &SchemaValidator, payload: &Value) -> Result<Self, Rejection> {
        validator.validate(payload, SchemaRef::ThingSubmission)?;
        serde_json::from_value(payload.clone())
            .map_err(|error| Rejection::invalid("/", "malformed", error.to_string()))
    }
}

/// Whether a submission created a record or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    Created,
    Updated,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    pub thing: Thing,
}

/// Domain use-case port for the ownership-gated create/update protocol.
#[async_trait]
pub trait ThingCommand: Send + Sync {
    /// Create the thing owned by `actor`, or update it if `actor` owns it.
    async fn submit(
        &self,
        submission: ThingSubmission,
        actor: &Identity,
    ) -> Result<SubmitOutcome, Rejection>;
}

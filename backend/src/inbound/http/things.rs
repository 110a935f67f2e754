//! Thing handlers.
//!
//! ```text
//! POST /api/v1/things        (authenticated; create or update)
//! GET  /api/v1/things
//! GET  /api/v1/things/{id}
//! ```
//!
//! Submission order: body schema, then authentication, then the domain rules
//! and the ownership gate inside the thing service.

use actix_web::{HttpRequest, get, post, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{SubmitAction, ThingSubmission};
use crate::domain::{ArtifactKind, Error, Thing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CallerCredentials;
use crate::inbound::http::links::{absolute, artifact_path};
use crate::inbound::http::schemas::SuccessStatus;
use crate::inbound::http::state::HttpState;

/// Outcome of a submission with the artifact upload targets.
#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub status: SuccessStatus,
    pub action: SubmitAction,
    pub thing: Thing,
    #[schema(example = "https://example.org/api/v1/things/11111111-1111-1111-1111-111111111111/source")]
    pub source_file_url: String,
    #[schema(example = "https://example.org/api/v1/things/11111111-1111-1111-1111-111111111111/view")]
    pub view_data_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct ThingResponse {
    pub status: SuccessStatus,
    pub thing: Thing,
}

#[derive(Serialize, ToSchema)]
pub struct ThingListResponse {
    pub status: SuccessStatus,
    pub things: Vec<Thing>,
}

/// Create a thing, or update one the caller owns.
#[utoipa::path(
    post,
    path = "/api/v1/things",
    request_body = ThingSubmission,
    responses(
        (status = 200, description = "Thing created or updated", body = SubmitResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Authentication failed", body = Error),
        (status = 403, description = "Thing owned by another user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["things"],
    operation_id = "submitThing"
)]
#[post("/things")]
pub async fn submit_thing(
    req: HttpRequest,
    state: web::Data<HttpState>,
    caller: CallerCredentials,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<SubmitResponse>> {
    let submission = ThingSubmission::parse(&state.validator, &payload)?;
    let actor = caller.require_identity(state.auth.as_ref()).await?;
    let outcome = state.things.submit(submission, &actor).await?;

    let id = outcome.thing.id();
    let source_file_url = absolute(&req, &artifact_path(id, ArtifactKind::SourceFile))?;
    let view_data_url = absolute(&req, &artifact_path(id, ArtifactKind::ViewData))?;
    Ok(web::Json(SubmitResponse {
        status: SuccessStatus::Success,
        action: outcome.action,
        source_file_url: source_file_url.into(),
        view_data_url: view_data_url.into(),
        thing: outcome.thing,
    }))
}

/// All stored things, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/things",
    responses(
        (status = 200, description = "Things", body = ThingListResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["things"],
    operation_id = "listThings",
    security([])
)]
#[get("/things")]
pub async fn list_things(state: web::Data<HttpState>) -> ApiResult<web::Json<ThingListResponse>> {
    let things = state.things_query.list().await?;
    Ok(web::Json(ThingListResponse {
        status: SuccessStatus::Success,
        things,
    }))
}

/// One stored thing.
#[utoipa::path(
    get,
    path = "/api/v1/things/{id}",
    params(("id" = String, Path, description = "Lowercase hyphenated UUID")),
    responses(
        (status = 200, description = "Thing", body = ThingResponse),
        (status = 404, description = "No such thing", body = Error)
    ),
    tags = ["things"],
    operation_id = "getThing",
    security([])
)]
#[get("/things/{id}")]
pub async fn get_thing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ThingResponse>> {
    let thing = state.things_query.get(&path).await?;
    Ok(web::Json(ThingResponse {
        status: SuccessStatus::Success,
        thing,
    }))
}

#[cfg(test)]
#[path = "things_tests.rs"]
mod tests;

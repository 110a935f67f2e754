//! Artifact upload and download handlers.
//!
//! ```text
//! POST /api/v1/things/{id}/source?filename=part.fcstd   (raw bytes)
//! POST /api/v1/things/{id}/view                         (JSON view data)
//! GET  /api/v1/things/{id}/source
//! GET  /api/v1/things/{id}/view
//! ```

use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use futures_util::StreamExt as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::SourceFileUpload;
use crate::domain::{ArtifactKind, ArtifactRef, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CallerCredentials;
use crate::inbound::http::error::payload_error;
use crate::inbound::http::schemas::SuccessStatus;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SourceFileQuery {
    /// Original file name; sanitised before storage.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ArtifactResponse {
    pub status: SuccessStatus,
    pub artifact: ArtifactRef,
}

async fn read_body(mut payload: web::Payload, limit: usize) -> ApiResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| payload_error(err, limit))?;
        if body.len() + chunk.len() > limit {
            return Err(payload_error(actix_web::error::PayloadError::Overflow, limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn stored(artifact: ArtifactRef) -> web::Json<ArtifactResponse> {
    web::Json(ArtifactResponse {
        status: SuccessStatus::Success,
        artifact,
    })
}

/// Upload the CAD source file of a thing the caller owns.
#[utoipa::path(
    post,
    path = "/api/v1/things/{id}/source",
    params(("id" = String, Path, description = "Thing identifier"), SourceFileQuery),
    request_body(content = String, content_type = "application/octet-stream", description = "Raw file bytes"),
    responses(
        (status = 200, description = "Source file stored", body = ArtifactResponse),
        (status = 400, description = "Invalid file", body = Error),
        (status = 401, description = "Authentication failed", body = Error),
        (status = 403, description = "Thing owned by another user", body = Error),
        (status = 404, description = "No such thing", body = Error)
    ),
    tags = ["artifacts"],
    operation_id = "uploadSourceFile"
)]
#[post("/things/{id}/source")]
pub async fn upload_source_file(
    state: web::Data<HttpState>,
    caller: CallerCredentials,
    path: web::Path<String>,
    query: web::Query<SourceFileQuery>,
    payload: web::Payload,
) -> ApiResult<web::Json<ArtifactResponse>> {
    let actor = caller.require_identity(state.auth.as_ref()).await?;
    let bytes = read_body(payload, state.max_upload_bytes).await?;
    let upload = SourceFileUpload {
        file_name: query.into_inner().filename.unwrap_or_default(),
        bytes,
    };
    let artifact = state
        .artifacts
        .upload_source_file(&path, &actor, upload)
        .await?;
    Ok(stored(artifact))
}

/// Upload the 3D view data of a thing the caller owns.
#[utoipa::path(
    post,
    path = "/api/v1/things/{id}/view",
    params(("id" = String, Path, description = "Thing identifier")),
    request_body(content = crate::domain::ViewData, content_type = "application/json"),
    responses(
        (status = 200, description = "View data stored", body = ArtifactResponse),
        (status = 400, description = "Invalid view data", body = Error),
        (status = 401, description = "Authentication failed", body = Error),
        (status = 403, description = "Thing owned by another user", body = Error),
        (status = 404, description = "No such thing", body = Error)
    ),
    tags = ["artifacts"],
    operation_id = "uploadViewData"
)]
#[post("/things/{id}/view")]
pub async fn upload_view_data(
    state: web::Data<HttpState>,
    caller: CallerCredentials,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<ArtifactResponse>> {
    let actor = caller.require_identity(state.auth.as_ref()).await?;
    let artifact = state
        .artifacts
        .upload_view_data(&path, &actor, &payload)
        .await?;
    Ok(stored(artifact))
}

/// Download the CAD source file as an attachment.
#[utoipa::path(
    get,
    path = "/api/v1/things/{id}/source",
    params(("id" = String, Path, description = "Thing identifier")),
    responses(
        (status = 200, description = "Source file bytes", content_type = "application/x-extension-fcstd"),
        (status = 404, description = "No such thing or no source file", body = Error)
    ),
    tags = ["artifacts"],
    operation_id = "downloadSourceFile",
    security([])
)]
#[get("/things/{id}/source")]
pub async fn download_source_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let artifact = state
        .artifacts_query
        .download(&path, ArtifactKind::SourceFile)
        .await?;
    Ok(HttpResponse::Ok()
        .content_type(artifact.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.file_name)],
        })
        .body(artifact.bytes))
}

/// Download the 3D view data.
#[utoipa::path(
    get,
    path = "/api/v1/things/{id}/view",
    params(("id" = String, Path, description = "Thing identifier")),
    responses(
        (status = 200, description = "View data", body = crate::domain::ViewData),
        (status = 404, description = "No such thing or no view data", body = Error)
    ),
    tags = ["artifacts"],
    operation_id = "downloadViewData",
    security([])
)]
#[get("/things/{id}/view")]
pub async fn download_view_data(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let artifact = state
        .artifacts_query
        .download(&path, ArtifactKind::ViewData)
        .await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(artifact.bytes))
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;

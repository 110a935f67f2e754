//! Account handlers.
//!
//! ```text
//! POST /api/v1/register {"identity":"alice","email":"alice@example.org"}
//! POST /api/v1/login {"identity":"alice","secret":"…"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::RegistrationRequest;
use crate::domain::{Credential, Error, Rejection, SchemaRef, Transport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{StatusOnly, SuccessStatus};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/register`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub identity: String,
    #[schema(example = "alice@example.org")]
    pub email: String,
}

/// Successful registration. The secret is shown exactly once.
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub status: SuccessStatus,
    pub identity: String,
    pub email: String,
    pub secret: String,
}

/// Request body for `POST /api/v1/login`.
///
/// Without `identity` the secret is treated as a bearer token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub secret: String,
}

/// Successful login.
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub status: SuccessStatus,
    pub identity: String,
}

fn transport_of(req: &HttpRequest) -> Transport {
    Transport::from_scheme(req.connection_info().scheme())
}

fn login_credential(request: &LoginRequest) -> ApiResult<Credential> {
    let credential = match request.identity.as_deref() {
        Some(identity) => Credential::password(identity, &request.secret),
        None => Credential::token(&request.secret),
    };
    credential.map_err(|error| {
        Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "/", "code": "empty_credential" }))
    })
}

/// Create an account and issue its one-time secret.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Registration disabled or insecure transport", body = Error),
        (status = 409, description = "Identity already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<RegisterResponse>> {
    if !state.auth.registration_open() {
        return Err(Rejection::RegistrationDisabled.into());
    }
    let request = RegistrationRequest::parse(&state.validator, &payload)?;
    let registration = state.auth.register(request, transport_of(&req)).await?;
    Ok(web::Json(RegisterResponse {
        status: SuccessStatus::Success,
        identity: registration.identity.into(),
        email: registration.email.into(),
        secret: registration.secret.expose().to_owned(),
    }))
}

/// Verify a credential and establish a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Insecure transport", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<LoginResponse>> {
    state.validator.validate(&payload, SchemaRef::Login)?;
    let request: LoginRequest = serde_json::from_value(payload.into_inner()).map_err(|error| {
        Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "/", "code": "malformed" }))
    })?;
    let credential = login_credential(&request)?;
    let identity = state.auth.authenticate(&credential, transport_of(&req)).await?;
    session.persist_identity(&identity)?;
    info!(identity = %identity, "session established");
    Ok(web::Json(LoginResponse {
        status: SuccessStatus::Success,
        identity: identity.into(),
    }))
}

/// Drop the cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session cleared", body = StatusOnly)),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().json(StatusOnly::default())
}

#[cfg(test)]
mod tests;

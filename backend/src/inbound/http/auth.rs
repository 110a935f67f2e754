//! Credential extraction for HTTP handlers.
//!
//! Callers present credentials as `Authorization: Bearer <token>`,
//! `Authorization: Basic base64(identity:secret)`, or through the session
//! cookie set by `POST /api/v1/login`. Extraction only parses; verification
//! runs in the handler after the request body has been validated.

use actix_session::SessionExt;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::{Ready, ready};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::ports::Authenticator;
use crate::domain::{Credential, Error, Identity, Transport};

use super::ApiResult;
use super::session::SessionContext;

/// What the caller presented, before verification.
#[derive(Debug, Clone)]
pub enum Presented {
    /// A credential from the `Authorization` header.
    Credential(Credential),
    /// An identity restored from the session cookie.
    Session(Identity),
    /// Nothing at all.
    Anonymous,
}

/// Extractor bundling the presented credential with the request transport.
///
/// The transport is derived from the connection scheme, which honours
/// `Forwarded` and `X-Forwarded-Proto` set by a terminating proxy.
#[derive(Debug, Clone)]
pub struct CallerCredentials {
    presented: Presented,
    transport: Transport,
}

impl CallerCredentials {
    pub fn new(presented: Presented, transport: Transport) -> Self {
        Self {
            presented,
            transport,
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn presented(&self) -> &Presented {
        &self.presented
    }

    /// Verify the caller and return their identity.
    pub async fn require_identity(&self, auth: &dyn Authenticator) -> ApiResult<Identity> {
        match &self.presented {
            Presented::Credential(credential) => {
                Ok(auth.authenticate(credential, self.transport).await?)
            }
            Presented::Session(identity) => Ok(identity.clone()),
            Presented::Anonymous => Err(Error::unauthorized("authentication required")
                .with_details(json!({ "code": "credentials_missing" }))),
        }
    }
}

fn malformed_authorization() -> Error {
    Error::unauthorized("authentication failed")
        .with_details(json!({ "code": "malformed_authorization" }))
}

/// Parse the `Authorization` header, if present.
pub(crate) fn credential_from_headers(headers: &HeaderMap) -> ApiResult<Option<Credential>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| malformed_authorization())?;
    let (scheme, rest) = value
        .trim()
        .split_once(' ')
        .ok_or_else(malformed_authorization)?;
    let rest = rest.trim();
    let credential = if scheme.eq_ignore_ascii_case("bearer") {
        Credential::token(rest)
    } else if scheme.eq_ignore_ascii_case("basic") {
        let decoded = Zeroizing::new(STANDARD.decode(rest).map_err(|_| malformed_authorization())?);
        let decoded = std::str::from_utf8(&decoded).map_err(|_| malformed_authorization())?;
        let (identity, secret) = decoded.split_once(':').ok_or_else(malformed_authorization)?;
        Credential::password(identity, secret)
    } else {
        return Err(malformed_authorization());
    };
    credential.map(Some).map_err(|_| malformed_authorization())
}

fn extract(req: &HttpRequest) -> ApiResult<CallerCredentials> {
    let transport = Transport::from_scheme(req.connection_info().scheme());
    if let Some(credential) = credential_from_headers(req.headers())? {
        return Ok(CallerCredentials::new(Presented::Credential(credential), transport));
    }
    let session = SessionContext::new(req.get_session());
    let presented = match session.identity()? {
        Some(identity) => Presented::Session(identity),
        None => Presented::Anonymous,
    };
    Ok(CallerCredentials::new(presented, transport))
}

impl FromRequest for CallerCredentials {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req).map_err(actix_web::Error::from))
    }
}

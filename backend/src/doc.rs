//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, things,
//!   artifacts, tracker feed, health)
//! - **Schemas**: request and response bodies plus the domain records they
//!   embed
//! - **Security**: the session cookie and the `Authorization` header schemes
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::domain::ports::{SubmitAction, ThingSubmission};
use crate::domain::{ArtifactKind, ArtifactRef, Camera, Error, ErrorCode, Thing, ViewData};
use crate::inbound::http::artifacts::ArtifactResponse;
use crate::inbound::http::feed::{Feed, FeedAuthor, FeedEntry};
use crate::inbound::http::schemas::{StatusOnly, SuccessStatus};
use crate::inbound::http::things::{SubmitResponse, ThingListResponse, ThingResponse};
use crate::inbound::http::users::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the accepted credential schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
        components.add_security_scheme("BearerToken", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        components.add_security_scheme("BasicAuth", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cadinet API",
        description = "Shared repository of owned CAD things with source files and 3D view data.",
        license(
            name = "AGPL-3.0-or-later",
            url = "https://www.gnu.org/licenses/agpl-3.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerToken" = []), ("BasicAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::things::submit_thing,
        crate::inbound::http::things::list_things,
        crate::inbound::http::things::get_thing,
        crate::inbound::http::artifacts::upload_source_file,
        crate::inbound::http::artifacts::upload_view_data,
        crate::inbound::http::artifacts::download_source_file,
        crate::inbound::http::artifacts::download_view_data,
        crate::inbound::http::feed::tracker,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SuccessStatus,
        StatusOnly,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        ThingSubmission,
        SubmitAction,
        SubmitResponse,
        Thing,
        ThingResponse,
        ThingListResponse,
        ArtifactKind,
        ArtifactRef,
        ArtifactResponse,
        ViewData,
        Camera,
        Feed,
        FeedEntry,
        FeedAuthor,
    )),
    tags(
        (name = "users", description = "Registration and sessions"),
        (name = "things", description = "Owned thing records"),
        (name = "artifacts", description = "Source files and 3D view data"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("Thing", "owner")]
    #[case("Thing", "license_url")]
    #[case("SubmitResponse", "source_file_url")]
    #[case("ArtifactRef", "sha256")]
    fn schemas_expose_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).unwrap_or_else(|| panic!("{name} schema"));
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/things/{id}/source")]
    #[case("/tracker")]
    #[case("/health/live")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn credential_schemes_are_declared() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.as_ref().expect("components").security_schemes;
        for name in ["SessionCookie", "BearerToken", "BasicAuth"] {
            assert!(schemes.contains_key(name), "missing {name}");
        }
    }
}

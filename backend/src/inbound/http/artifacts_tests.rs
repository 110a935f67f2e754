//! Artifact uploads and downloads over HTTP.

use actix_web::http::{StatusCode, header};
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::{Authenticator, RegistrationRequest, ThingCommand, ThingSubmission};
use crate::domain::{Identity, Transport};
use crate::inbound::http::test_utils::{basic_auth, test_app};
use crate::test_support::MemoryServices;

const THING_ID: &str = "11111111-1111-1111-1111-111111111111";

struct Fixture {
    services: MemoryServices,
    alice: String,
    bob: String,
}

async fn register(services: &MemoryServices, identity: &str) -> String {
    let registration = services
        .auth
        .register(
            RegistrationRequest {
                identity: identity.to_owned(),
                email: format!("{identity}@example.org"),
            },
            Transport::Secure,
        )
        .await
        .expect("registration succeeds");
    basic_auth(identity, registration.secret.expose())
}

async fn fixture() -> Fixture {
    let services = MemoryServices::default();
    let alice = register(&services, "alice").await;
    let bob = register(&services, "bob").await;
    services
        .things
        .submit(
            ThingSubmission {
                id: THING_ID.into(),
                title: "Bracket".into(),
                description: "Holds shelves".into(),
                license: "MIT".into(),
                license_url: "http://opensource.org/licenses/MIT".into(),
            },
            &Identity::new("alice").expect("identity"),
        )
        .await
        .expect("create thing");
    Fixture {
        services,
        alice,
        bob,
    }
}

fn source_upload(auth: &str, file_name: &str, bytes: &'static [u8]) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/v1/things/{THING_ID}/source?filename={file_name}"))
        .insert_header(("authorization", auth))
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .set_payload(bytes)
}

fn triangle() -> Value {
    json!({
        "camera": { "x": 0.0, "y": 0.0, "z": 10.0 },
        "vertices": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        "facets": [[0, 1, 2]]
    })
}

#[actix_web::test]
async fn source_file_round_trips_as_attachment() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;

    let res = test::call_service(&app, source_upload(&fx.alice, "part.fcstd", b"solid").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["artifact"]["file_name"], "part.fcstd");
    assert_eq!(body["artifact"]["byte_len"], 5);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/things/{THING_ID}/source"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/x-extension-fcstd")
    );
    assert_eq!(
        res.headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"part.fcstd\"")
    );
    assert_eq!(test::read_body(res).await.as_ref(), b"solid");
}

#[actix_web::test]
async fn view_data_round_trips_as_json() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/things/{THING_ID}/view"))
            .insert_header(("authorization", fx.alice.as_str()))
            .set_json(triangle())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["artifact"]["file_name"], "view_data.json");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/things/{THING_ID}/view"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(res).await;
    assert_eq!(stored, triangle());
}

#[actix_web::test]
async fn non_owner_upload_is_forbidden() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;

    let res = test::call_service(&app, source_upload(&fx.bob, "part.fcstd", b"solid").to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(fx.services.blobs.write_count(), 0);
}

#[actix_web::test]
async fn anonymous_upload_is_unauthorised() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/things/{THING_ID}/source?filename=part.fcstd"))
            .set_payload(&b"solid"[..])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("part.stl", "unsupported_extension")]
#[case("", "invalid_filename")]
#[actix_web::test]
async fn bad_file_names_are_rejected(#[case] file_name: &str, #[case] code: &str) {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;
    let res = test::call_service(&app, source_upload(&fx.alice, file_name, b"solid").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "/filename");
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn oversized_upload_is_refused() {
    let fx = fixture().await;
    let state = fx.services.http_state().with_max_upload_bytes(4);
    let app = test::init_service(test_app(state)).await;
    let res = test::call_service(&app, source_upload(&fx.alice, "part.fcstd", b"too large").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "payload_too_large");
    assert_eq!(body["details"]["limit"], 4);
    assert_eq!(fx.services.blobs.write_count(), 0);
}

#[actix_web::test]
async fn invalid_view_data_names_the_field() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/things/{THING_ID}/view"))
            .insert_header(("authorization", fx.alice.as_str()))
            .set_json(json!({ "camera": { "x": 0, "y": 0 }, "vertices": [], "facets": [] }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "/camera/z");
}

#[rstest]
#[case("source", "artifact_not_found")]
#[case("view", "artifact_not_found")]
#[actix_web::test]
async fn missing_artifact_is_not_found(#[case] kind: &str, #[case] code: &str) {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/things/{THING_ID}/{kind}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn upload_to_unknown_thing_is_not_found() {
    let fx = fixture().await;
    let app = test::init_service(test_app(fx.services.http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/things/22222222-2222-2222-2222-222222222222/source?filename=part.fcstd")
            .insert_header(("authorization", fx.alice.as_str()))
            .set_payload(&b"solid"[..])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

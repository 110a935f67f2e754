//! HTTP coverage for registration, login, and logout.

use super::*;
use crate::domain::AuthSettings;
use crate::inbound::http::test_utils::test_app;
use crate::test_support::MemoryServices;
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;

fn post_json(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

fn alice_registration() -> Value {
    json!({ "identity": "alice", "email": "alice@example.org" })
}

#[actix_web::test]
async fn register_then_login_establishes_session() {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;

    let res = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["identity"], "alice");
    let secret = body["secret"].as_str().expect("secret issued").to_owned();

    let res = test::call_service(
        &app,
        post_json("/api/v1/login", json!({ "identity": "alice", "secret": secret }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|cookie| cookie.name() == "session"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "status": "success", "identity": "alice" }));
}

#[rstest]
#[case(json!({ "identity": "alice" }), "/email", "missing_field")]
#[case(json!({ "identity": "alice", "email": "a@b.c", "secret": "x" }), "/secret", "unexpected_field")]
#[case(json!({ "identity": "alice", "email": "nope" }), "/email", "invalid_email")]
#[case(json!({ "identity": "a b", "email": "a@b.c" }), "/identity", "invalid_identity")]
#[actix_web::test]
async fn register_rejects_invalid_payloads(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    let res = test::call_service(&app, post_json("/api/v1/register", payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    let first = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn disabled_registration_is_forbidden() {
    let services = MemoryServices::new(AuthSettings {
        registration_enabled: false,
        ..AuthSettings::default()
    });
    let app = test::init_service(test_app(services.http_state())).await;
    let res = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "identity": "a b", "email": "nope" }))]
#[case(json!({ "identity": 7, "extra": true }))]
#[case(alice_registration())]
#[actix_web::test]
async fn disabled_registration_fails_uniformly(#[case] body: Value) {
    let services = MemoryServices::new(AuthSettings {
        registration_enabled: false,
        ..AuthSettings::default()
    });
    let app = test::init_service(test_app(services.http_state())).await;
    let res = test::call_service(&app, post_json("/api/v1/register", body).to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "registration is disabled");
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn plain_http_is_refused_when_secure_transport_required() {
    let services = MemoryServices::new(AuthSettings {
        require_secure_transport: true,
        ..AuthSettings::default()
    });
    let app = test::init_service(test_app(services.http_state())).await;

    let plain = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;
    assert_eq!(plain.status(), StatusCode::FORBIDDEN);

    let secure = test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration())
            .insert_header(("x-forwarded-proto", "https"))
            .to_request(),
    )
    .await;
    assert_eq!(secure.status(), StatusCode::OK);
}

#[rstest]
#[case(json!({ "identity": "alice", "secret": "wrong" }))]
#[case(json!({ "identity": "mallory", "secret": "wrong" }))]
#[actix_web::test]
async fn login_failures_share_one_response(#[case] payload: Value) {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    test::call_service(
        &app,
        post_json("/api/v1/register", alice_registration()).to_request(),
    )
    .await;

    let res = test::call_service(&app, post_json("/api/v1/login", payload).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "authentication failed");
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn login_requires_a_secret() {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    let res = test::call_service(
        &app,
        post_json("/api/v1/login", json!({ "identity": "alice" })).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "/secret");
}

#[actix_web::test]
async fn malformed_json_uses_error_shape() {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["details"]["code"], "malformed");
}

#[actix_web::test]
async fn logout_always_succeeds() {
    let app = test::init_service(test_app(MemoryServices::default().http_state())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/v1/logout").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "status": "success" }));
}

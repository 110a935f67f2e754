//! Behavioural coverage for artifact uploads and downloads.

use super::*;
use crate::domain::ports::{SubmitAction, ThingCommand, ThingQuery, ThingSubmission};
use crate::test_support::MemoryServices;
use rstest::{fixture, rstest};
use serde_json::json;

const THING: &str = "11111111-1111-1111-1111-111111111111";

fn identity(name: &str) -> Identity {
    Identity::new(name).expect("identity")
}

fn thing_id() -> ThingId {
    ThingId::new(THING).expect("thing id")
}

fn submission() -> ThingSubmission {
    ThingSubmission {
        id: THING.to_owned(),
        title: "Shelf bracket".to_owned(),
        description: "Holds shelves".to_owned(),
        license: "MIT".to_owned(),
        license_url: "http://opensource.org/licenses/MIT".to_owned(),
    }
}

fn upload(name: &str, bytes: &[u8]) -> SourceFileUpload {
    SourceFileUpload {
        file_name: name.to_owned(),
        bytes: bytes.to_vec(),
    }
}

fn triangle() -> Value {
    json!({
        "camera": { "x": 0.0, "y": 0.0, "z": 10.0 },
        "vertices": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        "facets": [[0, 1, 2]]
    })
}

#[fixture]
async fn services() -> MemoryServices {
    let services = MemoryServices::default();
    let outcome = services
        .things
        .submit(submission(), &identity("alice"))
        .await
        .expect("create thing");
    assert_eq!(outcome.action, SubmitAction::Created);
    services
}

async fn stored(services: &MemoryServices) -> Thing {
    services.things.get(THING).await.expect("thing")
}

#[rstest]
#[tokio::test]
async fn owner_uploads_and_downloads_source_file(#[future] services: MemoryServices) {
    let services = services.await;
    let artifact = services
        .artifacts
        .upload_source_file(THING, &identity("alice"), upload("bracket.FCStd", b"cad"))
        .await
        .expect("upload");

    assert_eq!(artifact.file_name, "bracket.FCStd");
    assert_eq!(artifact.byte_len, 3);
    assert_eq!(artifact.sha256, hex::encode(Sha256::digest(b"cad")));
    assert_eq!(
        stored(&services).await.artifact(ArtifactKind::SourceFile),
        Some(&artifact)
    );

    let download = services
        .artifacts
        .download(THING, ArtifactKind::SourceFile)
        .await
        .expect("download");
    assert_eq!(download.bytes, b"cad");
    assert_eq!(download.file_name, "bracket.FCStd");
    assert_eq!(download.content_type, ArtifactKind::SourceFile.content_type());
}

#[rstest]
#[tokio::test]
async fn non_owner_upload_is_refused_before_validation(#[future] services: MemoryServices) {
    let services = services.await;
    let before = stored(&services).await;

    let source = services
        .artifacts
        .upload_source_file(THING, &identity("bob"), upload("", b""))
        .await;
    let view = services
        .artifacts
        .upload_view_data(THING, &identity("bob"), &json!({ "camera": 1 }))
        .await;

    for result in [source, view] {
        assert_eq!(
            result,
            Err(Rejection::OwnershipViolation { thing_id: thing_id() })
        );
    }
    assert_eq!(services.blobs.write_count(), 0);
    assert_eq!(stored(&services).await, before);
}

#[rstest]
#[case("22222222-2222-2222-2222-222222222222")]
#[case("not-a-uuid")]
#[tokio::test]
async fn upload_to_unknown_thing_is_not_found(
    #[future] services: MemoryServices,
    #[case] target: &str,
) {
    let services = services.await;
    let result = services
        .artifacts
        .upload_source_file(target, &identity("alice"), upload("part.fcstd", b"cad"))
        .await;
    assert_eq!(
        result,
        Err(Rejection::ThingNotFound {
            thing_id: target.to_owned()
        })
    );
    assert_eq!(services.blobs.write_count(), 0);
}

#[rstest]
#[case("part.stl", "unsupported_extension")]
#[case("fcstd", "unsupported_extension")]
#[case(".fcstd", "unsupported_extension")]
#[case("../..", "invalid_filename")]
#[case("???", "invalid_filename")]
#[tokio::test]
async fn rejects_unusable_file_names(
    #[future] services: MemoryServices,
    #[case] name: &str,
    #[case] code: &str,
) {
    let services = services.await;
    let result = services
        .artifacts
        .upload_source_file(THING, &identity("alice"), upload(name, b"cad"))
        .await;
    let Err(Rejection::PayloadInvalid(violation)) = result else {
        panic!("expected payload rejection for {name:?}, got {result:?}");
    };
    assert_eq!(violation.field, "/filename");
    assert_eq!(violation.code, code);
    assert_eq!(services.blobs.write_count(), 0);
}

#[rstest]
#[tokio::test]
async fn rejects_empty_source_file(#[future] services: MemoryServices) {
    let services = services.await;
    let result = services
        .artifacts
        .upload_source_file(THING, &identity("alice"), upload("part.fcstd", b""))
        .await;
    assert!(matches!(
        result,
        Err(Rejection::PayloadInvalid(ref v)) if v.code == "empty_file"
    ));
    assert!(stored(&services).await.artifact(ArtifactKind::SourceFile).is_none());
}

#[rstest]
#[tokio::test]
async fn path_components_are_stripped_from_file_names(#[future] services: MemoryServices) {
    let services = services.await;
    let artifact = services
        .artifacts
        .upload_source_file(
            THING,
            &identity("alice"),
            upload("C:\\models\\..\\my part.fcstd", b"cad"),
        )
        .await
        .expect("upload");
    assert_eq!(artifact.file_name, "my_part.fcstd");
}

#[rstest]
#[tokio::test]
async fn replacing_source_file_prunes_previous_blob(#[future] services: MemoryServices) {
    let services = services.await;
    let alice = identity("alice");
    services
        .artifacts
        .upload_source_file(THING, &alice, upload("first.fcstd", b"one"))
        .await
        .expect("first upload");
    services.clock.advance_seconds(60);
    let second = services
        .artifacts
        .upload_source_file(THING, &alice, upload("second.fcstd", b"two"))
        .await
        .expect("second upload");

    let location = BlobLocation::new(thing_id(), ArtifactKind::SourceFile);
    assert_eq!(
        services.blobs.file_names(&location).await,
        vec!["second.fcstd".to_owned()]
    );
    let thing = stored(&services).await;
    assert_eq!(thing.artifact(ArtifactKind::SourceFile), Some(&second));
    assert!(thing.updated_at() > thing.created_at());
}

#[rstest]
#[tokio::test]
async fn view_data_is_stored_as_canonical_json(#[future] services: MemoryServices) {
    let services = services.await;
    let artifact = services
        .artifacts
        .upload_view_data(THING, &identity("alice"), &triangle())
        .await
        .expect("upload view data");
    assert_eq!(artifact.file_name, VIEW_DATA_FILE_NAME);

    let download = services
        .artifacts
        .download(THING, ArtifactKind::ViewData)
        .await
        .expect("download");
    assert_eq!(download.content_type, "application/json");
    let decoded: Value = serde_json::from_slice(&download.bytes).expect("json");
    assert_eq!(decoded, triangle());
}

#[rstest]
#[case(json!({ "camera": { "x": 0, "y": 0 }, "vertices": [], "facets": [] }), "/camera/z", "missing_field")]
#[case(json!({ "camera": { "x": 0, "y": 0, "z": 1 }, "vertices": [[0.0, 1.0]], "facets": [] }), "/vertices/0", "min_items")]
#[case(json!({ "camera": { "x": 0, "y": 0, "z": 1 }, "vertices": [], "facets": [[0, -1, 2]] }), "/facets/0/1", "minimum")]
#[case(json!({ "camera": { "x": 0, "y": 0, "z": 1 }, "vertices": [[0, 0, 0]], "facets": [[0, 0, 3]] }), "/facets/0/2", "vertex_out_of_range")]
#[tokio::test]
async fn malformed_view_data_is_rejected_without_writes(
    #[future] services: MemoryServices,
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let services = services.await;
    let result = services
        .artifacts
        .upload_view_data(THING, &identity("alice"), &payload)
        .await;
    let Err(Rejection::PayloadInvalid(violation)) = result else {
        panic!("expected payload rejection, got {result:?}");
    };
    assert_eq!((violation.field.as_str(), violation.code), (field, code));
    assert_eq!(services.blobs.write_count(), 0);
    assert!(stored(&services).await.artifact(ArtifactKind::ViewData).is_none());
}

#[rstest]
#[tokio::test]
async fn download_distinguishes_missing_thing_from_missing_artifact(
    #[future] services: MemoryServices,
) {
    let services = services.await;
    let missing_artifact = services.artifacts.download(THING, ArtifactKind::ViewData).await;
    assert_eq!(
        missing_artifact,
        Err(Rejection::ArtifactNotFound {
            thing_id: thing_id(),
            kind: ArtifactKind::ViewData,
        })
    );

    let missing_thing = services
        .artifacts
        .download("33333333-3333-3333-3333-333333333333", ArtifactKind::ViewData)
        .await;
    assert!(matches!(missing_thing, Err(Rejection::ThingNotFound { .. })));
}

#[rstest]
#[case("report.pdf", "report.pdf")]
#[case("  spaced name.fcstd ", "spaced_name.fcstd")]
#[case("/abs/path/part.fcstd", "part.fcstd")]
#[case("__init__.fcstd", "init__.fcstd")]
#[case("naïve.fcstd", "nave.fcstd")]
#[case("", "")]
fn sanitises_file_names(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(sanitize_file_name(raw), expected);
}

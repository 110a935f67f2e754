//! Absolute links resolved against the incoming request.

use actix_web::HttpRequest;
use tracing::error;
use url::Url;

use crate::domain::{ArtifactKind, Error, ThingId};

use super::ApiResult;

/// Resolve `path` against the scheme and host the request arrived on.
pub fn absolute(req: &HttpRequest, path: &str) -> ApiResult<Url> {
    let info = req.connection_info();
    let base = format!("{}://{}/", info.scheme(), info.host());
    Url::parse(&base)
        .and_then(|base| base.join(path.trim_start_matches('/')))
        .map_err(|err| {
            error!(error = %err, base = %base, "failed to build absolute link");
            Error::internal(format!("failed to build link: {err}"))
        })
}

/// Path of the thing resource.
pub fn thing_path(id: &ThingId) -> String {
    format!("/api/v1/things/{id}")
}

/// Path used both to upload and to download an artifact kind.
pub fn artifact_path(id: &ThingId, kind: ArtifactKind) -> String {
    let leaf = match kind {
        ArtifactKind::SourceFile => "source",
        ArtifactKind::ViewData => "view",
    };
    format!("/api/v1/things/{id}/{leaf}")
}

//! Artifact upload and download contract.
//!
//! Uploads run existence, ownership, payload validation, blob write, and
//! finally the reference update, all under the thing's lock. A thing only
//! ever references a blob that was written successfully.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::domain::ports::{
    ArtifactBytes, ArtifactCommand, ArtifactQuery, BlobLocation, BlobStore, SourceFileUpload,
    ThingRepository,
};
use crate::domain::thing_service::lookup_thing_id;
use crate::domain::{
    ArtifactKind, ArtifactRef, Identity, KeyedLocks, Rejection, SchemaRef, SchemaValidator,
    Thing, ThingId, ViewData,
};

/// Extensions accepted for CAD source files, compared case-insensitively.
pub const SOURCE_FILE_EXTENSIONS: &[&str] = &["fcstd"];

/// Stored name of the view dataset.
pub const VIEW_DATA_FILE_NAME: &str = "view_data.json";

const MAX_FILE_NAME_CHARS: usize = 128;

/// Reduce a caller-supplied file name to a safe single path component.
///
/// Directory components are discarded, whitespace becomes `_`, characters
/// outside `[A-Za-z0-9._-]` are dropped, and dots or underscores at either
/// end are trimmed. The result may be empty.
///
/// # Examples
/// ```
/// use cadinet::domain::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_file_name("My Part (v2).FCStd"), "My_Part_v2.FCStd");
/// assert_eq!(sanitize_file_name("..."), "");
/// ```
pub fn sanitize_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();
    cleaned.trim_matches(['.', '_']).to_owned()
}

fn source_file_name(raw: &str) -> Result<String, Rejection> {
    let name = sanitize_file_name(raw);
    if name.is_empty() {
        return Err(Rejection::invalid(
            "/filename",
            "invalid_filename",
            "filename must contain letters or digits",
        ));
    }
    if name.chars().count() > MAX_FILE_NAME_CHARS {
        return Err(Rejection::invalid(
            "/filename",
            "filename_too_long",
            format!("filename must be at most {MAX_FILE_NAME_CHARS} characters"),
        ));
    }
    let accepted = name.rsplit_once('.').is_some_and(|(stem, extension)| {
        !stem.is_empty()
            && SOURCE_FILE_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
    });
    if !accepted {
        return Err(Rejection::invalid(
            "/filename",
            "unsupported_extension",
            format!(
                "filename must end in one of: {}",
                SOURCE_FILE_EXTENSIONS.join(", ")
            ),
        ));
    }
    Ok(name)
}

fn reference_for(file_name: String, bytes: &[u8]) -> ArtifactRef {
    ArtifactRef {
        file_name,
        byte_len: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(bytes)),
    }
}

/// Implements [`ArtifactCommand`] and [`ArtifactQuery`].
#[derive(Clone)]
pub struct ArtifactService {
    repository: Arc<dyn ThingRepository>,
    blobs: Arc<dyn BlobStore>,
    validator: Arc<SchemaValidator>,
    locks: KeyedLocks,
    clock: Arc<dyn Clock>,
}

impl ArtifactService {
    pub fn new(
        repository: Arc<dyn ThingRepository>,
        blobs: Arc<dyn BlobStore>,
        validator: Arc<SchemaValidator>,
        locks: KeyedLocks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            blobs,
            validator,
            locks,
            clock,
        }
    }

    async fn find_thing(&self, id: &ThingId) -> Result<Thing, Rejection> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| Rejection::ThingNotFound {
                thing_id: id.to_string(),
            })
    }

    async fn owned_thing(&self, id: &ThingId, actor: &Identity) -> Result<Thing, Rejection> {
        let thing = self.find_thing(id).await?;
        if !thing.is_owned_by(actor) {
            warn!(thing_id = %id, actor = %actor, owner = %thing.owner(), "ownership violation on upload");
            return Err(Rejection::OwnershipViolation {
                thing_id: id.clone(),
            });
        }
        Ok(thing)
    }

    /// Write the blob, then record the reference, then drop stale files.
    async fn store(
        &self,
        mut thing: Thing,
        kind: ArtifactKind,
        file_name: String,
        bytes: &[u8],
    ) -> Result<ArtifactRef, Rejection> {
        let location = BlobLocation::new(thing.id().clone(), kind);
        self.blobs.write(&location, &file_name, bytes).await?;

        let artifact = reference_for(file_name, bytes);
        thing.attach_artifact(kind, artifact.clone(), self.clock.utc());
        self.repository.replace(&thing).await?;

        if let Err(error) = self.blobs.prune(&location, &artifact.file_name).await {
            warn!(thing_id = %thing.id(), kind = %kind, error = %error, "failed to prune stale artifact files");
        }
        info!(
            thing_id = %thing.id(),
            kind = %kind,
            bytes = artifact.byte_len,
            "artifact stored"
        );
        Ok(artifact)
    }
}

#[async_trait]
impl ArtifactCommand for ArtifactService {
    async fn upload_source_file(
        &self,
        thing_id: &str,
        actor: &Identity,
        upload: SourceFileUpload,
    ) -> Result<ArtifactRef, Rejection> {
        let id = lookup_thing_id(thing_id)?;
        let _guard = self.locks.lock(id.as_ref()).await;
        let thing = self.owned_thing(&id, actor).await?;

        let file_name = source_file_name(&upload.file_name)?;
        if upload.bytes.is_empty() {
            return Err(Rejection::invalid("/file", "empty_file", "source file is empty"));
        }
        self.store(thing, ArtifactKind::SourceFile, file_name, &upload.bytes)
            .await
    }

    async fn upload_view_data(
        &self,
        thing_id: &str,
        actor: &Identity,
        payload: &Value,
    ) -> Result<ArtifactRef, Rejection> {
        let id = lookup_thing_id(thing_id)?;
        let _guard = self.locks.lock(id.as_ref()).await;
        let thing = self.owned_thing(&id, actor).await?;

        self.validator.validate(payload, SchemaRef::ViewData)?;
        let view: ViewData = serde_json::from_value(payload.clone())
            .map_err(|error| Rejection::invalid("/", "malformed", error.to_string()))?;
        view.check_facet_indices()?;
        let bytes = serde_json::to_vec(&view)
            .map_err(|error| Rejection::storage(format!("encode view data: {error}")))?;

        self.store(
            thing,
            ArtifactKind::ViewData,
            VIEW_DATA_FILE_NAME.to_owned(),
            &bytes,
        )
        .await
    }
}

#[async_trait]
impl ArtifactQuery for ArtifactService {
    async fn download(&self, thing_id: &str, kind: ArtifactKind) -> Result<ArtifactBytes, Rejection> {
        let id = lookup_thing_id(thing_id)?;
        let thing = self.find_thing(&id).await?;
        let Some(artifact) = thing.artifact(kind) else {
            return Err(Rejection::ArtifactNotFound { thing_id: id, kind });
        };

        let location = BlobLocation::new(id.clone(), kind);
        let Some(bytes) = self.blobs.read(&location, &artifact.file_name).await? else {
            error!(thing_id = %id, kind = %kind, file = %artifact.file_name, "referenced artifact missing from blob store");
            return Err(Rejection::storage(format!(
                "artifact {kind} of thing {id} is missing from storage"
            )));
        };
        Ok(ArtifactBytes {
            file_name: artifact.file_name.clone(),
            content_type: kind.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "artifact_service_tests.rs"]
mod tests;

//! Thing aggregate: an owned CAD record with optional artifact references.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Identity;

/// Validation error raised by [`ThingId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("thing id must be a lowercase hyphenated UUID")]
pub struct InvalidThingId;

/// Canonical externally supplied thing identifier.
///
/// Only the lowercase hyphenated UUID form is accepted, so two spellings of
/// the same UUID can never address different records.
///
/// # Examples
/// ```
/// use cadinet::domain::ThingId;
///
/// assert!(ThingId::new("11111111-1111-1111-1111-111111111111").is_ok());
/// assert!(ThingId::new("11111111111111111111111111111111").is_err());
/// assert!(ThingId::new("AAAAAAAA-1111-1111-1111-111111111111").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThingId(String);

impl ThingId {
    /// Validate and construct a thing identifier.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidThingId> {
        let raw = value.as_ref();
        let parsed = Uuid::parse_str(raw).map_err(|_| InvalidThingId)?;
        let canonical = parsed.hyphenated().to_string();
        if canonical != raw {
            return Err(InvalidThingId);
        }
        Ok(Self(canonical))
    }
}

impl AsRef<str> for ThingId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ThingId> for String {
    fn from(value: ThingId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ThingId {
    type Error = InvalidThingId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The two artifact kinds a thing may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// CAD source file.
    SourceFile,
    /// Precomputed 3D preview dataset.
    ViewData,
}

impl ArtifactKind {
    /// Stable tag used in logs, storage paths, and error details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceFile => "source_file",
            Self::ViewData => "view_data",
        }
    }

    /// Content type used when serving the artifact.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::SourceFile => "application/x-extension-fcstd",
            Self::ViewData => "application/json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a stored artifact, recorded only after the blob write succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactRef {
    /// Sanitised file name within the artifact's storage location.
    #[schema(example = "bracket.fcstd")]
    pub file_name: String,
    /// Stored size in bytes.
    pub byte_len: u64,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub sha256: String,
}

/// Sanitised, license-checked metadata ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingMetadata {
    pub title: String,
    pub description: String,
    pub license: String,
    pub license_url: String,
}

/// Stored thing record.
///
/// ## Invariants
/// - `owner` is set once at creation and never changes.
/// - Artifact references point at blobs that were written before the
///   reference was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Thing {
    #[schema(value_type = String, example = "11111111-1111-1111-1111-111111111111")]
    id: ThingId,
    #[schema(example = "Shelf bracket")]
    title: String,
    description: String,
    #[schema(example = "MIT")]
    license: String,
    #[schema(example = "http://opensource.org/licenses/MIT")]
    license_url: String,
    #[schema(value_type = String, example = "alice")]
    owner: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_file: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    view_data: Option<ArtifactRef>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Thing {
    /// Create a new record owned by `owner`.
    pub fn create(id: ThingId, metadata: ThingMetadata, owner: Identity, now: DateTime<Utc>) -> Self {
        let ThingMetadata {
            title,
            description,
            license,
            license_url,
        } = metadata;
        Self {
            id,
            title,
            description,
            license,
            license_url,
            owner,
            source_file: None,
            view_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable metadata, keeping owner and artifact references.
    pub fn apply_metadata(&mut self, metadata: ThingMetadata, now: DateTime<Utc>) {
        let ThingMetadata {
            title,
            description,
            license,
            license_url,
        } = metadata;
        self.title = title;
        self.description = description;
        self.license = license;
        self.license_url = license_url;
        self.updated_at = now;
    }

    /// Record a stored artifact, replacing any previous reference of that kind.
    pub fn attach_artifact(&mut self, kind: ArtifactKind, artifact: ArtifactRef, now: DateTime<Utc>) {
        match kind {
            ArtifactKind::SourceFile => self.source_file = Some(artifact),
            ArtifactKind::ViewData => self.view_data = Some(artifact),
        }
        self.updated_at = now;
    }

    /// Whether `identity` owns this thing.
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }

    pub fn id(&self) -> &ThingId {
        &self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn license(&self) -> &str {
        self.license.as_str()
    }

    pub fn license_url(&self) -> &str {
        self.license_url.as_str()
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Reference to the stored artifact of `kind`, if any.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactRef> {
        match kind {
            ArtifactKind::SourceFile => self.source_file.as_ref(),
            ArtifactKind::ViewData => self.view_data.as_ref(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for thing identifiers and record mutation.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 5, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn metadata(title: &str) -> ThingMetadata {
        ThingMetadata {
            title: title.to_owned(),
            description: "desc".to_owned(),
            license: "MIT".to_owned(),
            license_url: "http://opensource.org/licenses/MIT".to_owned(),
        }
    }

    fn artifact() -> ArtifactRef {
        ArtifactRef {
            file_name: "part.fcstd".to_owned(),
            byte_len: 3,
            sha256: "abc".to_owned(),
        }
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("11111111-1111-1111-1111-11111111111")]
    #[case("{11111111-1111-1111-1111-111111111111}")]
    #[case("urn:uuid:11111111-1111-1111-1111-111111111111")]
    #[case("ABCDEF01-1111-1111-1111-111111111111")]
    #[case(" 11111111-1111-1111-1111-111111111111")]
    fn rejects_non_canonical_ids(#[case] raw: &str) {
        assert_eq!(ThingId::new(raw), Err(InvalidThingId));
    }

    #[rstest]
    fn accepts_canonical_id() {
        let id = ThingId::new("0f8fad5b-d9cb-469f-a165-70867728950e").expect("canonical");
        assert_eq!(id.as_ref(), "0f8fad5b-d9cb-469f-a165-70867728950e");
    }

    #[rstest]
    fn metadata_update_preserves_owner_and_artifacts(now: DateTime<Utc>) {
        let id = ThingId::new("11111111-1111-1111-1111-111111111111").expect("id");
        let owner = Identity::new("alice").expect("identity");
        let mut thing = Thing::create(id, metadata("first"), owner.clone(), now);
        thing.attach_artifact(ArtifactKind::SourceFile, artifact(), now);

        let later = now + chrono::TimeDelta::minutes(5);
        thing.apply_metadata(metadata("second"), later);

        assert_eq!(thing.title(), "second");
        assert_eq!(thing.owner(), &owner);
        assert_eq!(thing.artifact(ArtifactKind::SourceFile), Some(&artifact()));
        assert!(thing.artifact(ArtifactKind::ViewData).is_none());
        assert_eq!(thing.created_at(), now);
        assert_eq!(thing.updated_at(), later);
    }
}

//! Driving port for ownership-gated artifact uploads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ArtifactRef, Identity, Rejection};

/// Source file as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileUpload {
    /// Caller-supplied file name; sanitised before use.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ArtifactCommand: Send + Sync {
    /// Replace the CAD source file of a thing owned by `actor`.
    async fn upload_source_file(
        &self,
        thing_id: &str,
        actor: &Identity,
        upload: SourceFileUpload,
    ) -> Result<ArtifactRef, Rejection>;

    /// Replace the 3D view dataset of a thing owned by `actor`.
    async fn upload_view_data(
        &self,
        thing_id: &str,
        actor: &Identity,
        payload: &Value,
    ) -> Result<ArtifactRef, Rejection>;
}

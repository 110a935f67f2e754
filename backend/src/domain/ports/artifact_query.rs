//! Driving port for public artifact downloads.

use async_trait::async_trait;

use crate::domain::{ArtifactKind, Rejection};

/// Stored artifact ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBytes {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ArtifactQuery: Send + Sync {
    /// Fetch the artifact of `kind`; missing things and missing artifacts
    /// are reported separately.
    async fn download(&self, thing_id: &str, kind: ArtifactKind) -> Result<ArtifactBytes, Rejection>;
}

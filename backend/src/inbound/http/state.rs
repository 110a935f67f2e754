//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::SchemaValidator;
use crate::domain::ports::{
    ArtifactCommand, ArtifactQuery, Authenticator, ThingCommand, ThingQuery,
};

/// Default ceiling for request bodies: 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn Authenticator>,
    pub things: Arc<dyn ThingCommand>,
    pub things_query: Arc<dyn ThingQuery>,
    pub artifacts: Arc<dyn ArtifactCommand>,
    pub artifacts_query: Arc<dyn ArtifactQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn Authenticator>,
    pub things: Arc<dyn ThingCommand>,
    pub things_query: Arc<dyn ThingQuery>,
    pub artifacts: Arc<dyn ArtifactCommand>,
    pub artifacts_query: Arc<dyn ArtifactQuery>,
    pub validator: Arc<SchemaValidator>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from a ports bundle and the request validator.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use cadinet::inbound::http::state::{HttpState, HttpStatePorts};
    /// use cadinet::test_support::MemoryServices;
    ///
    /// let services = MemoryServices::default();
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         auth: services.auth.clone(),
    ///         things: services.things.clone(),
    ///         things_query: services.things.clone(),
    ///         artifacts: services.artifacts.clone(),
    ///         artifacts_query: services.artifacts.clone(),
    ///     },
    ///     services.validator.clone(),
    /// );
    /// assert!(state.validator.defects().is_empty());
    /// ```
    pub fn new(ports: HttpStatePorts, validator: Arc<SchemaValidator>) -> Self {
        let HttpStatePorts {
            auth,
            things,
            things_query,
            artifacts,
            artifacts_query,
        } = ports;
        Self {
            auth,
            things,
            things_query,
            artifacts,
            artifacts_query,
            validator,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the request body ceiling.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}

//! Builders wiring the filesystem adapters into the domain services.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use cadinet::domain::{
    ArtifactService, AuthService, AuthStrategy, KeyedLocks, LicenseRegistry, PasswordStrategy,
    SchemaValidator, ThingService, TokenStrategy,
};
use cadinet::inbound::http::state::{HttpState, HttpStatePorts};
use cadinet::outbound::{
    DocumentCredentialStore, DocumentThingRepository, FsBlobStore, FsDocumentStore,
};
use cadinet::settings::AuthStrategyKind;

use super::ServerConfig;

fn build_strategy(kind: AuthStrategyKind) -> io::Result<Arc<dyn AuthStrategy>> {
    match kind {
        AuthStrategyKind::Password => {
            let strategy = PasswordStrategy::new()
                .map_err(|e| io::Error::other(format!("password strategy setup failed: {e}")))?;
            Ok(Arc::new(strategy))
        }
        AuthStrategyKind::Token => Ok(Arc::new(TokenStrategy)),
    }
}

/// Open the stores under the data directory and build the HTTP state.
///
/// # Errors
/// Returns [`io::Error`] when a store directory cannot be opened or the
/// authentication strategy cannot be initialised.
pub fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let documents = Arc::new(FsDocumentStore::open(&config.records_dir())?);
    let blobs = Arc::new(FsBlobStore::open(&config.artifacts_dir())?);
    let credentials = Arc::new(DocumentCredentialStore::new(documents.clone()));
    let repository = Arc::new(DocumentThingRepository::new(documents));
    let validator = Arc::new(SchemaValidator::builtin());
    let clock = Arc::new(DefaultClock);
    let locks = KeyedLocks::default();

    let auth = Arc::new(AuthService::new(
        credentials,
        build_strategy(config.strategy)?,
        config.auth,
    ));
    let things = Arc::new(ThingService::new(
        repository.clone(),
        Arc::new(LicenseRegistry::default()),
        locks.clone(),
        clock.clone(),
    ));
    let artifacts = Arc::new(ArtifactService::new(
        repository,
        blobs,
        validator.clone(),
        locks,
        clock,
    ));

    info!(
        data_dir = %config.data_dir.display(),
        strategy = ?config.strategy,
        "stores opened"
    );
    let state = HttpState::new(
        HttpStatePorts {
            auth,
            things: things.clone(),
            things_query: things,
            artifacts: artifacts.clone(),
            artifacts_query: artifacts,
        },
        validator,
    )
    .with_max_upload_bytes(config.max_upload_bytes);
    Ok(web::Data::new(state))
}

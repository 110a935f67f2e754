//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for `cfg(test)` and the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    ArtifactService, AuthService, AuthSettings, AuthStrategy, KeyedLocks, LicenseRegistry,
    PasswordStrategy, SchemaValidator, ThingService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::{
    DocumentCredentialStore, DocumentThingRepository, MemoryBlobStore, MemoryDocumentStore,
};

/// Fixed instant used as the starting point of test clocks.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2014, 5, 1, 12, 0, 0).single() {
        Some(now) => now,
        None => panic!("fixture timestamp is valid"),
    }
}

/// Clock whose time only moves when a test advances it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_now())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Domain services wired over in-memory adapters.
///
/// Every handle shares the same stores, so state written through one
/// service is visible to the others and to assertions on `blobs`.
#[derive(Clone)]
pub struct MemoryServices {
    pub auth: Arc<AuthService>,
    pub things: Arc<ThingService>,
    pub artifacts: Arc<ArtifactService>,
    pub credentials: Arc<DocumentCredentialStore>,
    pub repository: Arc<DocumentThingRepository>,
    pub blobs: Arc<MemoryBlobStore>,
    pub validator: Arc<SchemaValidator>,
    pub clock: Arc<MutableClock>,
    pub locks: KeyedLocks,
}

impl MemoryServices {
    /// Services using the password strategy with cheap Argon2 parameters.
    pub fn new(settings: AuthSettings) -> Self {
        let strategy = match PasswordStrategy::insecure_fast() {
            Ok(strategy) => strategy,
            Err(error) => panic!("argon2 test parameters rejected: {error}"),
        };
        Self::with_strategy(settings, Arc::new(strategy))
    }

    /// Services using an explicit authentication strategy.
    pub fn with_strategy(settings: AuthSettings, strategy: Arc<dyn AuthStrategy>) -> Self {
        let documents = Arc::new(MemoryDocumentStore::new());
        let credentials = Arc::new(DocumentCredentialStore::new(documents.clone()));
        let repository = Arc::new(DocumentThingRepository::new(documents));
        let blobs = Arc::new(MemoryBlobStore::new());
        let validator = Arc::new(SchemaValidator::builtin());
        let clock = Arc::new(MutableClock::default());
        let locks = KeyedLocks::default();

        let auth = Arc::new(AuthService::new(credentials.clone(), strategy, settings));
        let things = Arc::new(ThingService::new(
            repository.clone(),
            Arc::new(LicenseRegistry::default()),
            locks.clone(),
            clock.clone(),
        ));
        let artifacts = Arc::new(ArtifactService::new(
            repository.clone(),
            blobs.clone(),
            validator.clone(),
            locks.clone(),
            clock.clone(),
        ));
        Self {
            auth,
            things,
            artifacts,
            credentials,
            repository,
            blobs,
            validator,
            clock,
            locks,
        }
    }
}

impl MemoryServices {
    /// HTTP state whose ports are these services.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                auth: self.auth.clone(),
                things: self.things.clone(),
                things_query: self.things.clone(),
                artifacts: self.artifacts.clone(),
                artifacts_query: self.artifacts.clone(),
            },
            self.validator.clone(),
        )
    }
}

impl Default for MemoryServices {
    fn default() -> Self {
        Self::new(AuthSettings::default())
    }
}

//! Authenticator implementation over a credential store and a strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{AuthStrategy, Credential, OneTimeSecret, Registration, Transport};
use crate::domain::ports::{
    Authenticator, CredentialStore, CredentialStoreError, RegistrationRequest,
};
use crate::domain::{Email, Identity, Rejection, User};

/// Configuration threaded into [`AuthService`] at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// When false every registration is refused.
    pub registration_enabled: bool,
    /// When true credentials sent over plain HTTP are refused.
    pub require_secure_transport: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            registration_enabled: true,
            require_secure_transport: false,
        }
    }
}

/// Registration and authentication backed by a pluggable strategy.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    strategy: Arc<dyn AuthStrategy>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        strategy: Arc<dyn AuthStrategy>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            store,
            strategy,
            settings,
        }
    }

    fn require_transport(&self, transport: Transport) -> Result<(), Rejection> {
        if self.settings.require_secure_transport && transport == Transport::Insecure {
            return Err(Rejection::InsecureTransport);
        }
        Ok(())
    }
}

#[async_trait]
impl Authenticator for AuthService {
    fn registration_open(&self) -> bool {
        self.settings.registration_enabled
    }

    async fn register(
        &self,
        request: RegistrationRequest,
        transport: Transport,
    ) -> Result<Registration, Rejection> {
        if !self.registration_open() {
            return Err(Rejection::RegistrationDisabled);
        }
        self.require_transport(transport)?;

        let identity = Identity::new(request.identity)
            .map_err(|error| Rejection::invalid("/identity", "invalid_identity", error.to_string()))?;
        let email = Email::new(request.email)
            .map_err(|error| Rejection::invalid("/email", "invalid_email", error.to_string()))?;

        let secret = OneTimeSecret::generate();
        let verifier = self.strategy.derive_verifier(&secret).await?;
        let user = User::new(identity.clone(), email.clone(), verifier);
        match self.store.insert_if_absent(&user).await {
            Ok(()) => {}
            Err(CredentialStoreError::AlreadyExists { .. }) => {
                warn!(identity = %identity, "registration refused: identity taken");
                return Err(Rejection::Conflict { identity });
            }
            Err(other) => return Err(other.into()),
        }

        info!(identity = %identity, strategy = self.strategy.name(), "registered user");
        Ok(Registration {
            identity,
            email,
            secret,
        })
    }

    async fn authenticate(
        &self,
        credential: &Credential,
        transport: Transport,
    ) -> Result<Identity, Rejection> {
        self.require_transport(transport)?;
        match self.strategy.authenticate(self.store.as_ref(), credential).await {
            Ok(identity) => Ok(identity),
            Err(Rejection::AuthenticationFailure) => {
                warn!(strategy = self.strategy.name(), "authentication failed");
                Err(Rejection::AuthenticationFailure)
            }
            Err(other) => Err(other),
        }
    }
}

//! Interchangeable verifier schemes.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{Credential, OneTimeSecret};
use crate::domain::ports::CredentialStore;
use crate::domain::{Identity, Rejection, Verifier};

/// Raised when a strategy cannot be initialised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthSetupError {
    /// Argon2 parameters were rejected.
    #[error("invalid argon2 parameters: {message}")]
    Params { message: String },
    /// Hashing the timing-equaliser secret failed.
    #[error("failed to derive dummy verifier: {message}")]
    Hash { message: String },
}

/// A scheme for deriving verifiers and checking presented credentials.
///
/// Every failure is reported as [`Rejection::AuthenticationFailure`] so
/// callers cannot tell an unknown identity from a wrong secret.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Derive the verifier stored for a freshly issued secret.
    async fn derive_verifier(&self, secret: &OneTimeSecret) -> Result<Verifier, Rejection>;

    /// Resolve `credential` to the identity it proves.
    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        credential: &Credential,
    ) -> Result<Identity, Rejection>;
}

/// Identity + secret checked against an Argon2id PHC string.
#[derive(Clone)]
pub struct PasswordStrategy {
    hasher: Arc<Argon2<'static>>,
    dummy_verifier: Arc<str>,
}

impl PasswordStrategy {
    /// Strategy using the Argon2 crate's default Argon2id parameters.
    pub fn new() -> Result<Self, AuthSetupError> {
        Self::with_params(Params::default())
    }

    /// Strategy using explicit Argon2id cost parameters.
    pub fn with_params(params: Params) -> Result<Self, AuthSetupError> {
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_verifier = hash_secret(&hasher, OneTimeSecret::generate().expose())
            .map_err(|message| AuthSetupError::Hash { message })?;
        Ok(Self {
            hasher: Arc::new(hasher),
            dummy_verifier: dummy_verifier.into(),
        })
    }

    /// Cheapest parameters Argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Result<Self, AuthSetupError> {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .map_err(|error| AuthSetupError::Params {
                message: error.to_string(),
            })?;
        Self::with_params(params)
    }

    async fn verify_blocking(&self, phc: String, secret: Zeroizing<String>) -> bool {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || {
            PasswordHash::new(&phc)
                .and_then(|parsed| hasher.verify_password(secret.as_bytes(), &parsed))
                .is_ok()
        })
        .await
        .unwrap_or(false)
    }
}

fn hash_secret(hasher: &Argon2<'_>, secret: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| error.to_string())
}

#[async_trait]
impl AuthStrategy for PasswordStrategy {
    fn name(&self) -> &'static str {
        "password"
    }

    async fn derive_verifier(&self, secret: &OneTimeSecret) -> Result<Verifier, Rejection> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.clone();
        tokio::task::spawn_blocking(move || hash_secret(&hasher, secret.expose()))
            .await
            .map_err(|error| Rejection::storage(format!("verifier task failed: {error}")))?
            .map(Verifier::Argon2)
            .map_err(|message| Rejection::storage(format!("failed to derive verifier: {message}")))
    }

    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        credential: &Credential,
    ) -> Result<Identity, Rejection> {
        let Credential::Password { identity, secret } = credential else {
            return Err(Rejection::AuthenticationFailure);
        };
        let user = match Identity::new(identity.as_str()) {
            Ok(identity) => store.find(&identity).await?,
            Err(_) => None,
        };
        let stored = match user.as_ref().map(|user| user.verifier()) {
            Some(Verifier::Argon2(phc)) => Some(phc.clone()),
            _ => None,
        };
        // Unknown identities still pay for one hash verification.
        let phc = stored.as_deref().unwrap_or(&*self.dummy_verifier).to_owned();
        let verified = self.verify_blocking(phc, secret.clone()).await;
        match user {
            Some(user) if verified && stored.is_some() => Ok(user.identity().clone()),
            _ => Err(Rejection::AuthenticationFailure),
        }
    }
}

/// Bearer token looked up by its SHA-256 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenStrategy;

impl TokenStrategy {
    /// Verifier for `token`.
    pub fn digest(token: &str) -> Verifier {
        Verifier::Sha256(hex::encode(Sha256::digest(token.as_bytes())))
    }
}

#[async_trait]
impl AuthStrategy for TokenStrategy {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn derive_verifier(&self, secret: &OneTimeSecret) -> Result<Verifier, Rejection> {
        Ok(Self::digest(secret.expose()))
    }

    async fn authenticate(
        &self,
        store: &dyn CredentialStore,
        credential: &Credential,
    ) -> Result<Identity, Rejection> {
        let presented = Self::digest(credential.secret());
        let user = store
            .find_by_verifier(&presented)
            .await?
            .ok_or(Rejection::AuthenticationFailure)?;
        // A token presented with an identity must belong to that identity.
        match credential.claimed_identity() {
            Some(claimed) if claimed != user.identity().as_ref() => {
                Err(Rejection::AuthenticationFailure)
            }
            _ => Ok(user.identity().clone()),
        }
    }
}

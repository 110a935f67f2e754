//! Authentication primitives: presented credentials, one-time secrets, and
//! the pluggable strategies that turn a credential into a verified identity.
//!
//! Inbound adapters build a [`Credential`] from whatever the caller presented
//! and hand it to the [`Authenticator`](super::ports::Authenticator) port. The
//! rest of the system only ever sees the returned [`Identity`].

mod service;
mod strategy;

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::Identity;

pub use service::{AuthService, AuthSettings};
pub use strategy::{AuthSetupError, AuthStrategy, PasswordStrategy, TokenStrategy};

/// Number of random bytes in a freshly issued secret.
pub const SECRET_BYTES: usize = 32;

/// Error returned when a presented credential is structurally unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Identity was missing or blank once trimmed.
    #[error("identity must not be empty")]
    EmptyIdentity,
    /// Secret or token was blank.
    #[error("secret must not be empty")]
    EmptySecret,
}

/// Credential presented by a caller.
///
/// ## Invariants
/// - `identity` is trimmed and non-empty; it is not validated as an
///   [`Identity`] so malformed and unknown identities fail identically.
/// - Secrets are non-empty and zeroed on drop.
///
/// # Examples
/// ```
/// use cadinet::domain::Credential;
///
/// let creds = Credential::password(" alice ", "s3cret").expect("shape");
/// assert_eq!(creds.claimed_identity(), Some("alice"));
/// assert!(Credential::token("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Identity plus secret, checked against the stored verifier.
    Password {
        identity: String,
        secret: Zeroizing<String>,
    },
    /// Bearer token looked up directly by its verifier.
    Token { token: Zeroizing<String> },
}

impl Credential {
    /// Build an identity + secret credential.
    pub fn password(identity: &str, secret: &str) -> Result<Self, CredentialValidationError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(CredentialValidationError::EmptyIdentity);
        }
        if secret.is_empty() {
            return Err(CredentialValidationError::EmptySecret);
        }
        Ok(Self::Password {
            identity: identity.to_owned(),
            secret: Zeroizing::new(secret.to_owned()),
        })
    }

    /// Build a bearer-token credential.
    pub fn token(token: &str) -> Result<Self, CredentialValidationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialValidationError::EmptySecret);
        }
        Ok(Self::Token {
            token: Zeroizing::new(token.to_owned()),
        })
    }

    /// Identity the caller claims, if the credential names one.
    pub fn claimed_identity(&self) -> Option<&str> {
        match self {
            Self::Password { identity, .. } => Some(identity.as_str()),
            Self::Token { .. } => None,
        }
    }

    /// Secret material to check against a verifier.
    pub fn secret(&self) -> &str {
        match self {
            Self::Password { secret, .. } => secret.as_str(),
            Self::Token { token } => token.as_str(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { identity, .. } => f
                .debug_struct("Password")
                .field("identity", identity)
                .field("secret", &"<redacted>")
                .finish(),
            Self::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Whether the request carrying a credential arrived over a secure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Secure,
    Insecure,
}

impl Transport {
    /// Classify a URL scheme such as `https` or `http`.
    pub fn from_scheme(scheme: &str) -> Self {
        if scheme.eq_ignore_ascii_case("https") {
            Self::Secure
        } else {
            Self::Insecure
        }
    }
}

/// Secret issued once at registration.
///
/// Only its verifier is stored; the plaintext is handed to the caller and
/// dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeSecret(Zeroizing<String>);

impl OneTimeSecret {
    /// Draw [`SECRET_BYTES`] bytes from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; SECRET_BYTES]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// The plaintext secret.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OneTimeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OneTimeSecret(<redacted>)")
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identity: Identity,
    pub email: super::Email,
    pub secret: OneTimeSecret,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialValidationError::EmptyIdentity)]
    #[case("   ", "pw", CredentialValidationError::EmptyIdentity)]
    #[case("alice", "", CredentialValidationError::EmptySecret)]
    fn rejects_blank_password_credentials(
        #[case] identity: &str,
        #[case] secret: &str,
        #[case] expected: CredentialValidationError,
    ) {
        assert_eq!(Credential::password(identity, secret), Err(expected));
    }

    #[rstest]
    fn password_secret_keeps_whitespace() {
        let creds = Credential::password("alice", " pw ").expect("shape");
        assert_eq!(creds.secret(), " pw ");
    }

    #[rstest]
    fn token_is_trimmed() {
        let creds = Credential::token("  abc \n").expect("shape");
        assert_eq!(creds.secret(), "abc");
        assert_eq!(creds.claimed_identity(), None);
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let creds = Credential::password("alice", "hunter2").expect("shape");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
        let secret = OneTimeSecret::generate();
        assert!(!format!("{secret:?}").contains(secret.expose()));
    }

    #[rstest]
    fn generated_secrets_are_hex_and_distinct() {
        let first = OneTimeSecret::generate();
        let second = OneTimeSecret::generate();
        assert_eq!(first.expose().len(), SECRET_BYTES * 2);
        assert!(first.expose().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("https", Transport::Secure)]
    #[case("HTTPS", Transport::Secure)]
    #[case("http", Transport::Insecure)]
    fn classifies_schemes(#[case] scheme: &str, #[case] expected: Transport) {
        assert_eq!(Transport::from_scheme(scheme), expected);
    }
}

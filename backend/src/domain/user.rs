//! Registered users and their identity primitives.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors raised by [`Identity`] and [`Email`] constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyIdentity,
    IdentityTooShort { min: usize },
    IdentityTooLong { max: usize },
    IdentityInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentity => write!(f, "identity must not be empty"),
            Self::IdentityTooShort { min } => {
                write!(f, "identity must be at least {min} characters")
            }
            Self::IdentityTooLong { max } => {
                write!(f, "identity must be at most {max} characters")
            }
            Self::IdentityInvalidCharacters => write!(
                f,
                "identity may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Minimum allowed length for an identity.
pub const IDENTITY_MIN: usize = 3;
/// Maximum allowed length for an identity.
pub const IDENTITY_MAX: usize = 64;

#[expect(clippy::expect_used, reason = "pattern is a literal covered by unit tests")]
static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_.-]+$").expect("identity regex compiles"));

#[expect(clippy::expect_used, reason = "pattern is a literal covered by unit tests")]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"));

/// Canonical identity string chosen at registration.
///
/// Used everywhere as the owner reference of things and artifacts. The
/// character set keeps identities safe to use as storage keys.
///
/// # Examples
/// ```
/// use cadinet::domain::Identity;
///
/// let alice = Identity::new("alice").expect("valid identity");
/// assert_eq!(alice.as_ref(), "alice");
/// assert!(Identity::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Validate and construct an identity.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(value.into())
    }

    fn from_owned(value: String) -> Result<Self, UserValidationError> {
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyIdentity);
        }
        let length = value.chars().count();
        if length < IDENTITY_MIN {
            return Err(UserValidationError::IdentityTooShort { min: IDENTITY_MIN });
        }
        if length > IDENTITY_MAX {
            return Err(UserValidationError::IdentityTooLong { max: IDENTITY_MAX });
        }
        if !IDENTITY_RE.is_match(&value) || value.starts_with('.') {
            return Err(UserValidationError::IdentityInvalidCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl TryFrom<String> for Identity {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Contact address captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(value.into())
    }

    fn from_owned(value: String) -> Result<Self, UserValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// One-way value used to check a presented secret.
///
/// The scheme tag records which authentication strategy derived it so a
/// record created under one strategy is never checked by the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", content = "value", rename_all = "snake_case")]
pub enum Verifier {
    /// Argon2id PHC string.
    Argon2(String),
    /// Lowercase hex SHA-256 digest of a bearer token.
    Sha256(String),
}

/// Registered account as held by the credential store.
///
/// ## Invariants
/// - `identity` is immutable once stored.
/// - `verifier` never contains the plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    identity: Identity,
    email: Email,
    verifier: Verifier,
}

impl User {
    /// Assemble a user record from validated parts.
    pub fn new(identity: Identity, email: Email, verifier: Verifier) -> Self {
        Self {
            identity,
            email,
            verifier,
        }
    }

    /// Canonical identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Contact address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored verifier.
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }
}

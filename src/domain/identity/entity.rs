//! Acting identities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

/// Maximum length for identity values
pub const MAX_IDENTITY_LENGTH: usize = 100;

/// Identities are usernames or e-mail style handles issued by the session provider
static IDENTITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._@-]*$").unwrap());

/// Validated identity of a user known to the identity/session provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Create a new validated identity
    pub fn new(value: impl Into<String>) -> Result<Self, EngineError> {
        let value = value.into();
        validate_identity(&value)?;
        Ok(Self(value))
    }

    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate an identity string
pub fn validate_identity(value: &str) -> Result<(), EngineError> {
    if value.is_empty() {
        return Err(EngineError::validation("Identity cannot be empty"));
    }

    if value.len() > MAX_IDENTITY_LENGTH {
        return Err(EngineError::validation(format!(
            "Identity exceeds maximum length of {} characters",
            MAX_IDENTITY_LENGTH
        )));
    }

    if !IDENTITY_PATTERN.is_match(value) {
        return Err(EngineError::validation(format!(
            "Invalid identity '{}': must start alphanumeric and contain only alphanumerics, '.', '_', '@' or '-'",
            value
        )));
    }

    Ok(())
}

/// An acting identity together with its session capabilities.
///
/// Produced by the external identity/session collaborator; the engine never
/// derives `is_admin` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    identity: Identity,
    is_admin: bool,
}

impl Actor {
    /// Create a regular (non-administrator) actor
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            is_admin: false,
        }
    }

    /// Create an actor carrying the administrative override capability
    pub fn admin(identity: Identity) -> Self {
        Self {
            identity,
            is_admin: true,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

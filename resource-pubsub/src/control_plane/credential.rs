//! Credential identity keying used by connection and subscription ownership.

use crate::observability::fields;
use std::fmt::{self, Debug, Display, Formatter};

/// Opaque authentication context, e.g. an API key.
///
/// Both the connection registry and the subscription ledger are keyed by it.
/// Formatting never reveals the full secret.
#[derive(Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct CredentialKey(String);

impl CredentialKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, used as the transport password.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CredentialKey {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for CredentialKey {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl Display for CredentialKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", fields::redact_secret(&self.0))
    }
}

impl Debug for CredentialKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialKey")
            .field(&fields::redact_secret(&self.0))
            .finish()
    }
}

//! Client identity used as signing material.

use std::fmt;

use crate::CredentialError;

/// The client id and shared secret that credentials are minted from.
///
/// An identity is immutable once built. Its [`Debug`] output never contains
/// the secret. It has no serde implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    client_id: String,
    client_secret: String,
}

impl Identity {
    /// Create a new identity.
    ///
    /// Construction does not validate the values. Missing material is
    /// reported when a credential is issued, see [`Identity::validate`].
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Get the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.client_secret.as_bytes()
    }

    /// Check that both the client id and the secret are present.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.client_id.trim().is_empty() {
            return Err(CredentialError::Configuration(
                "client id is missing or empty".into(),
            ));
        }

        if self.client_secret.is_empty() {
            return Err(CredentialError::Configuration(
                "client secret is missing or empty".into(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

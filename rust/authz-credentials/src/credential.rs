//! The signed bearer credential and its compact encoding.
//!
//! A credential is encoded as three base64url segments joined by dots:
//! `header.claims.signature`, where the signature is computed over
//! `header.claims` (the encoded segments, not the raw JSON).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Algorithm, Claims, CredentialError};

/// Credential header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signing algorithm
    pub alg: String,
    /// Token type, always `JWT`
    pub typ: String,
}

impl Header {
    pub(crate) fn new(algorithm: Algorithm) -> Self {
        Self {
            alg: algorithm.as_str().to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// A signed, time-bounded bearer credential.
///
/// The token is a secret for as long as it is valid, so neither [`Debug`] nor
/// any other formatting exposes it. Use [`Credential::token`] to present it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    claims: Claims,
}

impl Credential {
    /// Sign `claims` with `key` and encode the result.
    pub(crate) fn sign(
        claims: Claims,
        algorithm: Algorithm,
        key: &[u8],
    ) -> Result<Self, CredentialError> {
        let header = encode_segment(&Header::new(algorithm))?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{}.{}", header, payload);

        let signature = algorithm.sign(key, signing_input.as_bytes())?;
        let token = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature));

        Ok(Self { token, claims })
    }

    /// The opaque token to present as `Authorization: Bearer <token>`.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The claims this credential was minted from.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Client id the credential speaks for.
    pub fn client_id(&self) -> &str {
        &self.claims.client_id
    }

    /// Issuance instant.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.claims.issued_at()
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    /// Whether the credential is no longer valid at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims.is_expired_at(now)
    }

    /// Take the token string out of the credential.
    pub fn into_token(self) -> String {
        self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, CredentialError> {
    let json = serde_json::to_vec(value).map_err(|e| CredentialError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

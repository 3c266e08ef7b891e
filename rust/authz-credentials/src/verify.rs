//! Verification of presented credentials.
//!
//! This is the check the authorization service performs on the bearer token.
//! The client never needs it on the request path, but it lets holders of the
//! shared secret confirm what a token asserts.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::credential::Header;
use crate::{Algorithm, Claims, Identity, VerificationError};

/// Checks credentials signed with a shared client secret.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    identity: Arc<Identity>,
    algorithm: Algorithm,
}

impl CredentialVerifier {
    /// Create a verifier for HS256 credentials signed by `identity`.
    pub fn new(identity: Identity) -> Self {
        Self::from_shared(Arc::new(identity))
    }

    pub(crate) fn from_shared(identity: Arc<Identity>) -> Self {
        Self {
            identity,
            algorithm: Algorithm::default(),
        }
    }

    /// Set the algorithm credentials are expected to use.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Verify `token` against the current time and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
        let malformed = || VerificationError::Malformed("expected three dot-separated segments".into());
        let (signing_input, signature) = token.rsplit_once('.').ok_or_else(malformed)?;
        let (header, payload) = signing_input.split_once('.').ok_or_else(malformed)?;
        if payload.contains('.') {
            return Err(malformed());
        }

        let header: Header = decode_segment(header)?;
        if header.alg != self.algorithm.as_str() {
            return Err(VerificationError::AlgorithmMismatch {
                expected: self.algorithm.to_string(),
                actual: header.alg,
            });
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| VerificationError::Malformed(format!("signature: {}", e)))?;

        if !self
            .algorithm
            .verify(self.identity.secret(), signing_input.as_bytes(), &signature)
        {
            return Err(VerificationError::InvalidSignature);
        }

        let claims: Claims = decode_segment(payload)?;
        if claims.is_expired_at(now) {
            return Err(VerificationError::Expired {
                expires_at: claims.exp,
            });
        }

        Ok(claims)
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, VerificationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| VerificationError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| VerificationError::Malformed(e.to_string()))
}

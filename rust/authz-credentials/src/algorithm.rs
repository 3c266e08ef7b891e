//! HMAC signing algorithms supported for credentials.

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use crate::CredentialError;

/// Symmetric signing algorithm, named as in the credential header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC with SHA-256
    #[default]
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
}

impl Algorithm {
    /// Header name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    /// Compute the signature of `message` under `key`.
    pub(crate) fn sign(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, CredentialError> {
        match self {
            Self::HS256 => hmac_sign::<Hmac<Sha256>>(key, message),
            Self::HS384 => hmac_sign::<Hmac<Sha384>>(key, message),
            Self::HS512 => hmac_sign::<Hmac<Sha512>>(key, message),
        }
    }

    /// Check `signature` against `message` in constant time.
    pub(crate) fn verify(&self, key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::HS256 => hmac_verify::<Hmac<Sha256>>(key, message, signature),
            Self::HS384 => hmac_verify::<Hmac<Sha384>>(key, message, signature),
            Self::HS512 => hmac_verify::<Hmac<Sha512>>(key, message, signature),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CredentialError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            _ => Err(CredentialError::Signing(format!(
                "unsupported algorithm '{}'",
                name
            ))),
        }
    }
}

fn hmac_sign<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, CredentialError> {
    let mut mac =
        <M as KeyInit>::new_from_slice(key).map_err(|e| CredentialError::Signing(e.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_verify<M: Mac + KeyInit>(key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    match <M as KeyInit>::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(message);
            mac.verify_slice(signature).is_ok()
        }
        Err(_) => false,
    }
}

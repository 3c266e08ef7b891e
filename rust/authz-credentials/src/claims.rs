use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of every issued credential.
pub const CREDENTIAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims embedded in a credential.
///
/// Timestamps are Unix seconds, and `exp` is always `iat` plus
/// [`CREDENTIAL_TTL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Client id of the identity that minted the credential
    pub client_id: String,
    /// Issued-at
    pub iat: i64,
    /// Expiry
    pub exp: i64,
    /// Optional issuer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Unique credential id
    pub jti: String,
}

impl Claims {
    pub(crate) fn new(client_id: &str, issued_at: DateTime<Utc>, issuer: Option<&str>) -> Self {
        let iat = issued_at.timestamp();
        let nonce: [u8; 16] = rand::random();

        Self {
            client_id: client_id.to_string(),
            iat,
            exp: iat + CREDENTIAL_TTL.as_secs() as i64,
            iss: issuer.map(str::to_string),
            jti: URL_SAFE_NO_PAD.encode(nonce),
        }
    }

    /// Issued-at as a UTC datetime.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    /// Expiry as a UTC datetime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Whether the credential is no longer valid at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

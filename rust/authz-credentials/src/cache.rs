use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{Credential, CredentialError, CredentialIssuer, Issuer};

/// How long before expiry a cached credential is replaced.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Reuses one credential until it is close to expiry.
///
/// This is opt-in. A plain [`CredentialIssuer`] mints per call, which is the
/// default contract of the client. The cache holds a single credential since
/// it serves a single identity.
#[derive(Debug)]
pub struct CredentialCache {
    issuer: CredentialIssuer,
    refresh_margin: Duration,
    current: Mutex<Option<Credential>>,
}

impl CredentialCache {
    /// Wrap `issuer` with the default refresh margin.
    pub fn new(issuer: CredentialIssuer) -> Self {
        Self {
            issuer,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            current: Mutex::new(None),
        }
    }

    /// Set how long before expiry a credential is replaced.
    pub fn with_refresh_margin(mut self, refresh_margin: Duration) -> Self {
        self.refresh_margin = refresh_margin;
        self
    }

    /// Return the cached credential, minting a new one if needed.
    pub fn issue(&self) -> Result<Credential, CredentialError> {
        self.issue_at(Utc::now())
    }

    /// Like [`CredentialCache::issue`] with an explicit current time.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<Credential, CredentialError> {
        let mut current = self.current.lock();

        if let Some(credential) = current.as_ref() {
            let margin = i64::try_from(self.refresh_margin.as_secs()).unwrap_or(i64::MAX);
            if now.timestamp().saturating_add(margin) < credential.claims().exp {
                return Ok(credential.clone());
            }
        }

        let credential = self.issuer.issue_at(now)?;
        *current = Some(credential.clone());

        Ok(credential)
    }

    /// Drop the cached credential so the next call mints a new one.
    pub fn invalidate(&self) {
        self.current.lock().take();
    }
}

impl Issuer for CredentialCache {
    fn issue(&self) -> Result<Credential, CredentialError> {
        CredentialCache::issue(self)
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{Algorithm, Claims, Credential, CredentialError, CredentialVerifier, Identity};

/// Trait describing anything that can hand out a bearer credential for a
/// single outbound request.
pub trait Issuer: Send + Sync {
    /// Produce a credential that is valid at the time of the call.
    fn issue(&self) -> Result<Credential, CredentialError>;
}

impl<T: Issuer + ?Sized> Issuer for Arc<T> {
    fn issue(&self) -> Result<Credential, CredentialError> {
        (**self).issue()
    }
}

/// Mints a fresh, self-signed credential on every call.
///
/// Issuance is synchronous and does no I/O. The identity is shared read-only,
/// so clones of an issuer can be used from many tasks at once.
///
/// # Example
///
/// ```
/// use authz_credentials::{CredentialIssuer, Identity};
///
/// let issuer = CredentialIssuer::new(Identity::new("svc-reports", "s3cr3t"))
///     .with_issuer("authorization-service");
///
/// let credential = issuer.issue().unwrap();
/// assert_eq!(credential.client_id(), "svc-reports");
/// assert_eq!(credential.token().split('.').count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    identity: Arc<Identity>,
    algorithm: Algorithm,
    issuer: Option<String>,
}

impl CredentialIssuer {
    /// Create an issuer that signs with HS256.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
            algorithm: Algorithm::default(),
            issuer: None,
        }
    }

    /// Set the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the `iss` claim stamped on every credential.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Get the identity credentials are minted from.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Get the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Build a verifier that accepts credentials from this issuer.
    pub fn verifier(&self) -> CredentialVerifier {
        CredentialVerifier::from_shared(self.identity.clone()).with_algorithm(self.algorithm)
    }

    /// Mint a credential valid for 24 hours from now.
    pub fn issue(&self) -> Result<Credential, CredentialError> {
        self.issue_at(Utc::now())
    }

    /// Mint a credential as if the current time were `issued_at`.
    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<Credential, CredentialError> {
        self.identity.validate()?;

        let claims = Claims::new(
            self.identity.client_id(),
            issued_at,
            self.issuer.as_deref(),
        );
        let credential = Credential::sign(claims, self.algorithm, self.identity.secret())?;

        tracing::debug!(
            client_id = credential.client_id(),
            expires_at = %credential.expires_at(),
            "issued credential"
        );

        Ok(credential)
    }
}

impl Issuer for CredentialIssuer {
    fn issue(&self) -> Result<Credential, CredentialError> {
        CredentialIssuer::issue(self)
    }
}

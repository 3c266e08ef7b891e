//! Self-signed bearer credentials for the authorization service client.
//!
//! A [`CredentialIssuer`] turns an [`Identity`] (client id and shared secret)
//! into a short-lived [`Credential`]: an HMAC-signed token whose claims carry
//! the client id, the issuance instant and an expiry exactly
//! [`CREDENTIAL_TTL`] later. The token is what the client presents as
//! `Authorization: Bearer <token>`.
//!
//! # Example
//!
//! ```
//! use authz_credentials::{CredentialIssuer, Identity, CREDENTIAL_TTL};
//!
//! let issuer = CredentialIssuer::new(Identity::new("svc-reports", "s3cr3t"));
//! let credential = issuer.issue()?;
//!
//! let ttl = (credential.expires_at() - credential.issued_at()).num_seconds();
//! assert_eq!(ttl as u64, CREDENTIAL_TTL.as_secs());
//!
//! // Holders of the same secret can check what the token asserts.
//! let claims = issuer.verifier().verify(credential.token()).unwrap();
//! assert_eq!(claims.client_id, "svc-reports");
//! # Ok::<(), authz_credentials::CredentialError>(())
//! ```

mod algorithm;
mod cache;
mod claims;
mod credential;
mod error;
mod identity;
mod issuer;
mod verify;

pub use algorithm::Algorithm;
pub use cache::{CredentialCache, DEFAULT_REFRESH_MARGIN};
pub use claims::{CREDENTIAL_TTL, Claims};
pub use credential::{Credential, Header};
pub use error::{CredentialError, VerificationError};
pub use identity::Identity;
pub use issuer::{CredentialIssuer, Issuer};
pub use verify::CredentialVerifier;

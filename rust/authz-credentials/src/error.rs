use thiserror::Error;

/// Errors that can occur while minting a credential.
///
/// Both variants are fatal to the call that produced them. Retrying without
/// changing the configuration yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Identity material is missing or unusable
    #[error("Credential configuration is invalid: {0}")]
    Configuration(String),

    /// The claims could not be signed
    #[error("Failed to sign credential: {0}")]
    Signing(String),
}

/// Errors that can occur while checking a presented credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The token is not a well-formed three-segment credential
    #[error("Malformed credential: {0}")]
    Malformed(String),

    /// The token header names a different algorithm than the verifier expects
    #[error("Credential is signed with {actual}, expected {expected}")]
    AlgorithmMismatch { expected: String, actual: String },

    /// The signature does not match the header and claims
    #[error("Credential signature is invalid")]
    InvalidSignature,

    /// The credential expiry has passed
    #[error("Credential expired at {expires_at}")]
    Expired { expires_at: i64 },
}

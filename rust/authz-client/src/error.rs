use authz_credentials::CredentialError;
use thiserror::Error;

/// Errors returned by [`crate::PolicyClient`] operations.
///
/// Every failure of a call is returned to the caller. Only
/// [`EvaluationError::Transport`] is worth retrying without changing
/// anything, see [`EvaluationError::is_retryable`].
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The client configuration is unusable (bad endpoint, bad timeout)
    #[error("Client configuration is invalid: {0}")]
    Configuration(String),

    /// Minting the bearer credential failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The caller supplied an unusable request
    #[error("Invalid policy request: {0}")]
    InvalidRequest(String),

    /// The request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// The response body could not be decoded
    #[error("Failed to deserialize response: {0}")]
    Deserialization(String),

    /// The request did not complete
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The authorization service answered with a non-success status
    #[error("Authorization service responded with HTTP {status}: {body}")]
    AuthorizationService { status: u16, body: String },
}

impl EvaluationError {
    /// Whether the same call may succeed if simply repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status of a rejected call, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthorizationService { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reasons an outbound request did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection to the service could not be established
    #[error("Failed to connect to authorization service: {0}")]
    Connect(String),

    /// The configured timeout elapsed
    #[error("Request to authorization service timed out: {0}")]
    Timeout(String),

    /// The caller cancelled the request before it completed
    #[error("Request to authorization service was cancelled")]
    Cancelled,

    /// Any other failure while sending or reading the request
    #[error("Request to authorization service failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

impl From<reqwest::Error> for EvaluationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            EvaluationError::Configuration(error.to_string())
        } else {
            EvaluationError::Transport(error.into())
        }
    }
}

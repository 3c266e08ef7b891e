//! Client configuration.

use authz_credentials::Identity;
use url::Url;

use crate::EvaluationError;

/// Environment variable holding the client id.
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
/// Environment variable holding the service base URL.
pub const ENDPOINT_VAR: &str = "AUTHZ_ENDPOINT";
/// Environment variable holding the tenant id.
pub const TENANT_ID_VAR: &str = "AUTHZ_TENANT_ID";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_SECONDS_VAR: &str = "AUTHZ_TIMEOUT_SECONDS";

const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for [`crate::PolicyClient`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the authorization service (e.g. "https://authz.example.com")
    pub endpoint: String,

    /// Tenant stamped on requests that do not name one
    pub tenant_id: Option<String>,

    /// Optional timeout for requests in seconds (default: 30)
    pub timeout_seconds: Option<u64>,

    /// Optional custom headers to send with each request
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tenant_id: None,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the tenant
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Disable the request timeout
    pub fn without_timeout(mut self) -> Self {
        self.timeout_seconds = None;
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// See [`ClientConfig::from_lookup`] for the variables consulted.
    pub fn from_env() -> Result<Self, EvaluationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// Consults [`ENDPOINT_VAR`], [`TENANT_ID_VAR`] and
    /// [`TIMEOUT_SECONDS_VAR`]; unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Configuration`] if the timeout is not a
    /// positive whole number of seconds.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EvaluationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = value(ENDPOINT_VAR) {
            config.endpoint = endpoint.trim().to_string();
        }

        config.tenant_id = value(TENANT_ID_VAR).map(|tenant| tenant.trim().to_string());

        if let Some(timeout) = value(TIMEOUT_SECONDS_VAR) {
            let seconds = timeout.trim().parse::<u64>().map_err(|e| {
                EvaluationError::Configuration(format!(
                    "{} must be a whole number of seconds: {}",
                    TIMEOUT_SECONDS_VAR, e
                ))
            })?;
            if seconds == 0 {
                return Err(EvaluationError::Configuration(format!(
                    "{} must be at least one second",
                    TIMEOUT_SECONDS_VAR
                )));
            }
            config.timeout_seconds = Some(seconds);
        }

        Ok(config)
    }

    /// Parse and check the endpoint URL.
    pub(crate) fn endpoint_url(&self) -> Result<Url, EvaluationError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            EvaluationError::Configuration(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(EvaluationError::Configuration(format!(
                "endpoint scheme must be http or https, got '{}'",
                scheme
            ))),
        }
    }
}

/// Read the client identity from the process environment.
///
/// Missing variables yield empty values. They are reported as a
/// configuration error when the first credential is issued, not here.
pub fn identity_from_env() -> Identity {
    identity_from_lookup(|name| std::env::var(name).ok())
}

/// Read the client identity through `lookup`.
pub fn identity_from_lookup<F>(lookup: F) -> Identity
where
    F: Fn(&str) -> Option<String>,
{
    Identity::new(
        lookup(CLIENT_ID_VAR).unwrap_or_default(),
        lookup(CLIENT_SECRET_VAR).unwrap_or_default(),
    )
}

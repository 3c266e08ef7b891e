//! HTTP client for the authorization service.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use authz_credentials::{Credential, CredentialIssuer, Issuer};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;
use url::Url;

use crate::config::identity_from_env;
use crate::{
    ClientConfig, EvaluationError, PolicyDecision, PolicyRequest, SimulationRequest,
    TransportError,
};

/// Header carrying the per-request correlation id.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

const CHECK_ACCESS_PATH: &str = "check-access";
const SIMULATE_PATH: &str = "simulate";
const COMPILE_PATH: &str = "compile";
const VALIDATE_POLICY_PATH: &str = "validate-policy";

#[derive(Serialize)]
struct CompileBody<'a> {
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
    rule: &'a str,
}

#[derive(Serialize)]
struct ValidatePolicyBody<'a> {
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
    policy: &'a str,
}

/// Submits authenticated policy decision requests.
///
/// Every call runs the same pipeline: validate the input, obtain a credential
/// from the issuer, send exactly one POST with the credential as a bearer
/// token, and interpret the response. There are no retries and no state is
/// kept between calls, so a client can be cloned and shared across tasks.
///
/// # Examples
///
/// ```no_run
/// use authz_client::{ClientConfig, PolicyClient};
/// use authz_credentials::{CredentialIssuer, Identity};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = CredentialIssuer::new(Identity::new("svc-reports", "s3cr3t"));
/// let config = ClientConfig::new("https://authz.example.com").with_tenant("acme");
/// let client = PolicyClient::new(config, issuer)?;
///
/// let decision = client
///     .evaluate("alice", "doc42", "read", json!({ "ip": "10.0.0.1" }))
///     .await?;
///
/// if decision.allowed {
///     println!("access granted");
/// }
/// # Ok(())
/// # }
/// ```
pub struct PolicyClient<I = CredentialIssuer> {
    config: ClientConfig,
    endpoint: Url,
    issuer: Arc<I>,
    client: Client,
}

impl<I> Clone for PolicyClient<I> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            endpoint: self.endpoint.clone(),
            issuer: self.issuer.clone(),
            client: self.client.clone(),
        }
    }
}

impl<I> fmt::Debug for PolicyClient<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("tenant_id", &self.config.tenant_id)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl PolicyClient<CredentialIssuer> {
    /// Build a client from `CLIENT_ID`, `CLIENT_SECRET` and the `AUTHZ_*`
    /// variables of the process environment.
    pub fn from_env() -> Result<Self, EvaluationError> {
        let config = ClientConfig::from_env()?;
        Self::new(config, CredentialIssuer::new(identity_from_env()))
    }
}

impl<I: Issuer> PolicyClient<I> {
    /// Create a client that authenticates with credentials from `issuer`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Configuration`] if the endpoint is not an
    /// http(s) URL, the timeout is zero, a custom header is not a valid HTTP
    /// header, or the HTTP client cannot be built.
    pub fn new(config: ClientConfig, issuer: I) -> Result<Self, EvaluationError> {
        let endpoint = config.endpoint_url()?;
        let headers = custom_headers(&config.headers)?;

        let mut client_builder = Client::builder().default_headers(headers);
        match config.timeout_seconds {
            Some(0) => {
                return Err(EvaluationError::Configuration(
                    "timeout must be at least one second".into(),
                ));
            }
            Some(timeout) => {
                client_builder = client_builder.timeout(Duration::from_secs(timeout));
            }
            None => {}
        }
        let client = client_builder
            .build()
            .map_err(|e| EvaluationError::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            endpoint,
            issuer: Arc::new(issuer),
            client,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the credential issuer.
    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Ask whether `subject` may perform `action` on `resource` under
    /// `conditions`.
    ///
    /// `conditions` may be any value that serializes to a JSON object or
    /// array; pass `()` for none.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::InvalidRequest`] for empty identifiers and
    /// [`EvaluationError::Serialization`] for unstructured conditions, both
    /// before a credential is issued. Otherwise see
    /// [`PolicyClient::evaluate_request`].
    pub async fn evaluate<C: Serialize>(
        &self,
        subject: &str,
        resource: &str,
        action: &str,
        conditions: C,
    ) -> Result<PolicyDecision, EvaluationError> {
        let request = PolicyRequest::new(subject, resource, action)?.with_conditions(conditions)?;
        self.evaluate_request(&request).await
    }

    /// Evaluate a prebuilt request.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::Credential`] if no credential could be issued
    /// - [`EvaluationError::Transport`] if the request did not complete
    /// - [`EvaluationError::AuthorizationService`] for a non-2xx answer
    /// - [`EvaluationError::Deserialization`] for an unreadable decision
    pub async fn evaluate_request(
        &self,
        request: &PolicyRequest,
    ) -> Result<PolicyDecision, EvaluationError> {
        self.check_access(request, None).await
    }

    /// Evaluate a prebuilt request, abandoning it once `cancellation` fires.
    ///
    /// A cancelled call returns [`TransportError::Cancelled`]. Nothing needs
    /// cleaning up: the in-flight request is simply dropped.
    pub async fn evaluate_with_cancellation(
        &self,
        request: &PolicyRequest,
        cancellation: &CancellationToken,
    ) -> Result<PolicyDecision, EvaluationError> {
        self.check_access(request, Some(cancellation)).await
    }

    /// Run a dry-run evaluation with explicit `context`.
    pub async fn simulate<C: Serialize>(
        &self,
        subject: &str,
        resource: &str,
        action: &str,
        context: C,
    ) -> Result<PolicyDecision, EvaluationError> {
        let mut simulation = SimulationRequest::new(subject, resource, action, context)?;
        if let Some(tenant_id) = &self.config.tenant_id {
            simulation = simulation.with_tenant(tenant_id.as_str());
        }

        let body = self.post(SIMULATE_PATH, &simulation, None).await?;
        PolicyDecision::from_slice(&body)
    }

    /// Compile a natural-language rule into a policy document.
    pub async fn compile_rule(&self, rule: &str) -> Result<String, EvaluationError> {
        if rule.trim().is_empty() {
            return Err(EvaluationError::InvalidRequest(
                "rule must not be empty".into(),
            ));
        }

        let body = CompileBody {
            tenant_id: self.config.tenant_id.as_deref(),
            rule,
        };
        let response = self.post(COMPILE_PATH, &body, None).await?;

        String::from_utf8(response).map_err(|e| EvaluationError::Deserialization(e.to_string()))
    }

    /// Ask the service to check a policy document without loading it.
    pub async fn validate_policy(&self, policy: &str) -> Result<(), EvaluationError> {
        if policy.trim().is_empty() {
            return Err(EvaluationError::InvalidRequest(
                "policy must not be empty".into(),
            ));
        }

        let body = ValidatePolicyBody {
            tenant_id: self.config.tenant_id.as_deref(),
            policy,
        };
        self.post(VALIDATE_POLICY_PATH, &body, None).await?;

        Ok(())
    }

    async fn check_access(
        &self,
        request: &PolicyRequest,
        cancellation: Option<&CancellationToken>,
    ) -> Result<PolicyDecision, EvaluationError> {
        let request = match (request.tenant_id(), &self.config.tenant_id) {
            (None, Some(tenant_id)) => Cow::Owned(request.clone().with_tenant(tenant_id.as_str())),
            _ => Cow::Borrowed(request),
        };

        let body = self
            .post(CHECK_ACCESS_PATH, &*request, cancellation)
            .await?;
        let decision = PolicyDecision::from_slice(&body)?;

        tracing::debug!(
            subject = request.subject(),
            resource = request.resource(),
            action = request.action(),
            allowed = decision.allowed,
            "policy evaluated"
        );

        Ok(decision)
    }

    /// Get the URL for a service path
    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }

    /// Build a request with authentication. Custom headers are attached by
    /// the underlying client.
    fn build_request(
        &self,
        builder: reqwest::RequestBuilder,
        credential: &Credential,
        correlation_id: &str,
    ) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(credential.token())
            .header(CORRELATION_ID_HEADER, correlation_id)
    }

    /// Issue a credential, send one authenticated POST and return the body
    /// of a successful response.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Vec<u8>, EvaluationError> {
        let credential = self.issuer.issue()?;
        let payload =
            serde_json::to_vec(body).map_err(|e| EvaluationError::Serialization(e.to_string()))?;

        let correlation_id = Ulid::new().to_string();
        let url = self.url_for(path);

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let request = self.build_request(request, &credential, &correlation_id);

        tracing::debug!(
            %url,
            client_id = credential.client_id(),
            correlation_id = %correlation_id,
            "sending request to authorization service"
        );

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, EvaluationError>((status, body))
        };

        let (status, body) = match cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(EvaluationError::Transport(TransportError::Cancelled)),
                result = exchange => result,
            },
            None => exchange.await,
        }
        .inspect_err(|e| {
            tracing::debug!(%url, correlation_id = %correlation_id, error = %e, "request did not complete");
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(
                %url,
                status = status.as_u16(),
                correlation_id = %correlation_id,
                "authorization service rejected request"
            );
            return Err(EvaluationError::AuthorizationService {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body.to_vec())
    }
}

/// Parse configured header pairs once, so a bad pair fails at construction.
fn custom_headers(pairs: &[(String, String)]) -> Result<HeaderMap, EvaluationError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());

    for (key, value) in pairs {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            EvaluationError::Configuration(format!("invalid header name '{}': {}", key, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            EvaluationError::Configuration(format!("invalid value for header '{}': {}", key, e))
        })?;
        headers.append(name, value);
    }

    Ok(headers)
}

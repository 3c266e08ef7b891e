//! Request payloads sent to the authorization service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EvaluationError;

/// A policy decision query: may `subject` perform `action` on `resource`
/// under `conditions`?
///
/// Built once per call and immutable afterwards. `conditions` is free-form
/// structured context (time of day, client address, attribute overrides and
/// so on). No schema is imposed beyond it being a JSON object or array.
///
/// The wire form is
/// `{"tenantID"?, "subject", "resource", "action", "conditions"}`, with
/// `tenantID` omitted when no tenant is set and `conditions` an empty object
/// when none were given.
///
/// Decoding goes through the same checks as [`PolicyRequest::new`] and
/// [`PolicyRequest::with_conditions`], so a decoded request is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicyRequest")]
pub struct PolicyRequest {
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    subject: String,
    resource: String,
    action: String,
    conditions: Value,
}

#[derive(Deserialize)]
struct RawPolicyRequest {
    #[serde(rename = "tenantID", default)]
    tenant_id: Option<String>,
    subject: String,
    resource: String,
    action: String,
    #[serde(default)]
    conditions: Value,
}

impl TryFrom<RawPolicyRequest> for PolicyRequest {
    type Error = EvaluationError;

    fn try_from(raw: RawPolicyRequest) -> Result<Self, Self::Error> {
        let mut request = PolicyRequest::new(raw.subject, raw.resource, raw.action)?
            .with_conditions(raw.conditions)?;
        request.tenant_id = raw.tenant_id;
        Ok(request)
    }
}

impl PolicyRequest {
    /// Create a request without conditions.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::InvalidRequest`] if any of the three
    /// identifiers is empty or only whitespace.
    pub fn new(
        subject: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, EvaluationError> {
        let subject = required("subject", subject.into())?;
        let resource = required("resource", resource.into())?;
        let action = required("action", action.into())?;

        Ok(Self {
            tenant_id: None,
            subject,
            resource,
            action,
            conditions: empty_conditions(),
        })
    }

    /// Attach conditions.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Serialization`] if `conditions` cannot be
    /// represented as JSON or is a scalar rather than an object or array.
    pub fn with_conditions<C: Serialize>(mut self, conditions: C) -> Result<Self, EvaluationError> {
        self.conditions = structured("conditions", conditions)?;
        Ok(self)
    }

    /// Scope the request to a tenant.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Get the tenant, if one was set.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Get the subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Get the resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Get the action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Get the conditions.
    pub fn conditions(&self) -> &Value {
        &self.conditions
    }

    /// Encode the request body.
    pub fn to_json(&self) -> Result<Vec<u8>, EvaluationError> {
        serde_json::to_vec(self).map_err(|e| EvaluationError::Serialization(e.to_string()))
    }
}

/// A dry-run evaluation with explicit context, answered without side effects
/// on the service (no audit of a real access).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationRequest")]
pub struct SimulationRequest {
    #[serde(rename = "tenantID", skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    subject: String,
    resource: String,
    action: String,
    context: Value,
}

#[derive(Deserialize)]
struct RawSimulationRequest {
    #[serde(rename = "tenantID", default)]
    tenant_id: Option<String>,
    subject: String,
    resource: String,
    action: String,
    #[serde(default)]
    context: Value,
}

impl TryFrom<RawSimulationRequest> for SimulationRequest {
    type Error = EvaluationError;

    fn try_from(raw: RawSimulationRequest) -> Result<Self, Self::Error> {
        let mut simulation =
            SimulationRequest::new(raw.subject, raw.resource, raw.action, raw.context)?;
        simulation.tenant_id = raw.tenant_id;
        Ok(simulation)
    }
}

impl SimulationRequest {
    /// Create a simulation with the given context.
    pub fn new<C: Serialize>(
        subject: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        context: C,
    ) -> Result<Self, EvaluationError> {
        Ok(Self {
            tenant_id: None,
            subject: required("subject", subject.into())?,
            resource: required("resource", resource.into())?,
            action: required("action", action.into())?,
            context: structured("context", context)?,
        })
    }

    /// Scope the simulation to a tenant.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Get the tenant, if one was set.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Get the context.
    pub fn context(&self) -> &Value {
        &self.context
    }
}

fn empty_conditions() -> Value {
    Value::Object(Map::new())
}

fn required(field: &str, value: String) -> Result<String, EvaluationError> {
    if value.trim().is_empty() {
        Err(EvaluationError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(value)
    }
}

fn structured<C: Serialize>(field: &str, value: C) -> Result<Value, EvaluationError> {
    match serde_json::to_value(value) {
        Ok(Value::Null) => Ok(empty_conditions()),
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(other) => Err(EvaluationError::Serialization(format!(
            "{} must be a JSON object or array, got {}",
            field, other
        ))),
        Err(e) => Err(EvaluationError::Serialization(format!("{}: {}", field, e))),
    }
}

use serde::Deserialize;
use serde_json::Value;

use crate::EvaluationError;

/// The authorization service's answer to a [`crate::PolicyRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// Whether the access is permitted
    pub allowed: bool,
    /// Why the service decided the way it did, if it said
    pub reason: Option<String>,
    /// The policy that produced the decision, if the service named one
    pub policy_id: Option<String>,
    /// The complete response body
    pub raw_response: Option<Value>,
}

/// Accepted response shape. Older services answer with `allow` and
/// `policyID`, newer ones with `allowed` and `policy_id`.
#[derive(Deserialize)]
struct DecisionBody {
    #[serde(alias = "allow")]
    allowed: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default, alias = "policyID")]
    policy_id: Option<String>,
}

impl PolicyDecision {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Deserialization`] if the body is not JSON or
    /// does not carry a boolean `allowed` (or `allow`) field.
    pub fn from_slice(body: &[u8]) -> Result<Self, EvaluationError> {
        let raw: Value = serde_json::from_slice(body)
            .map_err(|e| EvaluationError::Deserialization(e.to_string()))?;
        Self::from_value(raw)
    }

    /// Interpret an already parsed response body.
    pub fn from_value(raw: Value) -> Result<Self, EvaluationError> {
        let body = DecisionBody::deserialize(&raw)
            .map_err(|e| EvaluationError::Deserialization(e.to_string()))?;

        Ok(Self {
            allowed: body.allowed,
            reason: body.reason.filter(|reason| !reason.is_empty()),
            policy_id: body.policy_id.filter(|id| !id.is_empty()),
            raw_response: Some(raw),
        })
    }

    /// Shorthand for [`PolicyDecision::allowed`].
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

use authz_client::{ClientConfig, EvaluationError, PolicyClient};
use authz_credentials::CredentialIssuer;
use axum::http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::server::{Reply, identity, start_test_server};

const POLICY: &str = r#"{"id":"business-hours","effect":"deny","conditions":{"time":"outside 09:00-17:00"}}"#;

fn client(url: &str, tenant: Option<&str>) -> PolicyClient {
    let mut config = ClientConfig::new(url);
    if let Some(tenant) = tenant {
        config = config.with_tenant(tenant);
    }
    PolicyClient::new(config, CredentialIssuer::new(identity())).unwrap()
}

#[test_log::test(tokio::test)]
async fn it_compiles_a_rule_into_a_policy() {
    let server = start_test_server(Reply::Text(POLICY)).await;

    let policy = client(&server.url, Some("acme"))
        .compile_rule("deny access to payroll outside business hours")
        .await
        .unwrap();

    assert_eq!(policy, POLICY);

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, Method::POST);
    assert_eq!(received[0].path, "/compile");
    assert_eq!(
        received[0].body,
        json!({
            "tenantID": "acme",
            "rule": "deny access to payroll outside business hours"
        })
    );
}

#[test_log::test(tokio::test)]
async fn it_accepts_a_valid_policy() {
    let server = start_test_server(Reply::Text("Policy is valid")).await;

    client(&server.url, None)
        .validate_policy(POLICY)
        .await
        .unwrap();

    let received = server.received();
    assert_eq!(received[0].path, "/validate-policy");
    assert_eq!(received[0].body, json!({ "policy": POLICY }));
}

#[test_log::test(tokio::test)]
async fn it_reports_an_invalid_policy() {
    let server = start_test_server(Reply::Status(400, "unknown effect 'maybe'")).await;

    let result = client(&server.url, None).validate_policy("effect: maybe").await;

    match result {
        Err(EvaluationError::AuthorizationService { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("unknown effect"));
        }
        other => panic!("expected AuthorizationService error, got {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn it_simulates_with_explicit_context() {
    let server = start_test_server(Reply::Json(json!({
        "allowed": false,
        "reason": "outside business hours",
        "policy_id": "business-hours"
    })))
    .await;
    let context = json!({ "time": "22:15", "ip": "203.0.113.7" });

    let decision = client(&server.url, Some("acme"))
        .simulate("bob", "payroll", "read", &context)
        .await
        .unwrap();

    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("outside business hours"));

    let received = server.received();
    assert_eq!(received[0].path, "/simulate");
    assert_eq!(
        received[0].body,
        json!({
            "tenantID": "acme",
            "subject": "bob",
            "resource": "payroll",
            "action": "read",
            "context": context
        })
    );
}

#[test_log::test(tokio::test)]
async fn it_refuses_empty_inputs_without_any_request() {
    let server = start_test_server(Reply::Text(POLICY)).await;
    let client = client(&server.url, None);

    assert!(matches!(
        client.compile_rule("  ").await,
        Err(EvaluationError::InvalidRequest(_))
    ));
    assert!(matches!(
        client.validate_policy("").await,
        Err(EvaluationError::InvalidRequest(_))
    ));
    assert!(matches!(
        client.simulate("bob", "", "read", ()).await,
        Err(EvaluationError::InvalidRequest(_))
    ));
    assert!(server.received().is_empty());
}

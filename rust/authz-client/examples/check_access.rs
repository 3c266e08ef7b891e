use anyhow::Result;
use authz_client::PolicyClient;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let subject = std::env::var("SUBJECT")?;
    let resource = std::env::var("RESOURCE")?;
    let action = std::env::var("ACTION")?;

    let client = PolicyClient::from_env()?;
    eprintln!("ENDPOINT: {}", client.config().endpoint);

    let decision = client
        .evaluate(&subject, &resource, &action, json!({}))
        .await?;

    println!(
        "{subject} {action} {resource}: {}",
        if decision.allowed { "ALLOW" } else { "DENY" }
    );
    if let Some(reason) = decision.reason {
        println!("REASON: {reason}");
    }

    Ok(())
}
